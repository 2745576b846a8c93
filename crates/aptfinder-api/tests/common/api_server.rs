//! Minimal HTTP/1.1 server standing in for the listings backend.
//!
//! Every request is recorded (method, path with query, Authorization header)
//! and answered by a caller-supplied route function. One request per
//! connection; responses always close the connection.

use parking_lot::Mutex;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

pub type Route = dyn Fn(&str, &str) -> (u16, String) + Send + Sync;

pub struct ApiServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ApiServer {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

/// Starts a server in a background thread. The base URL ends in `/api`.
pub fn start<F>(route: F) -> ApiServer
where
    F: Fn(&str, &str) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let requests = Arc::new(Mutex::new(Vec::new()));
    let route: Arc<Route> = Arc::new(route);

    let recorded = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let recorded = Arc::clone(&recorded);
            let route = Arc::clone(&route);
            thread::spawn(move || handle(stream, &recorded, route.as_ref()));
        }
    });

    ApiServer {
        base_url: format!("http://127.0.0.1:{}/api", port),
        requests,
    }
}

fn handle(mut stream: TcpStream, recorded: &Mutex<Vec<RecordedRequest>>, route: &Route) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));

    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                data.extend_from_slice(&buf[..n]);
                if data.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
            Err(_) => return,
        }
    }

    let request = match std::str::from_utf8(&data) {
        Ok(s) => s,
        Err(_) => return,
    };
    let Some(parsed) = parse_request(request) else {
        return;
    };

    let api_path = parsed.path.strip_prefix("/api").unwrap_or(&parsed.path).to_string();
    let (status, body) = route(&parsed.method, &api_path);
    recorded.lock().push(RecordedRequest {
        path: api_path,
        ..parsed
    });

    let reason = match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Status",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
}

fn parse_request(request: &str) -> Option<RecordedRequest> {
    let mut lines = request.lines();
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let mut authorization = None;
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("authorization") {
                authorization = Some(value.trim().to_string());
            }
        }
    }

    Some(RecordedRequest {
        method,
        path,
        authorization,
    })
}
