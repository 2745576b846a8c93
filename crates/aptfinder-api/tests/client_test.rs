//! Integration test: the typed client against a local stand-in backend.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aptfinder_api::{ApiClient, ApiError, ListingFilters, ListingsApi, ScrapeApi};
use aptfinder_session::{Navigator, Session, SessionGuard};
use aptfinder_storage::Database;
use common::api_server;

#[derive(Default)]
struct CountingNavigator {
    redirects: AtomicUsize,
}

impl Navigator for CountingNavigator {
    fn navigate(&self, _path: &str) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}

fn backend(method: &str, path: &str) -> (u16, String) {
    match (method, path) {
        ("GET", "/neighborhoods") => (
            200,
            r#"[{"id": "204", "name": "Florentin"}, {"id": "1483", "name": "Neve Tzedek"}]"#
                .to_string(),
        ),
        ("GET", "/stats") => (
            200,
            r#"{"total_apartments": 30, "active_apartments": 25, "apartments_last_3_days": 9, "last_scrape": "2024-05-01T10:30:00"}"#
                .to_string(),
        ),
        ("GET", p) if p.starts_with("/apartments/") => (404, r#"{"detail": "Apartment not found"}"#.to_string()),
        ("GET", p) if p.starts_with("/apartments") => (
            200,
            r#"[{"id": 1, "title": "Flat", "price": 6000, "rooms": 3.0, "neighborhood": "Florentin",
                 "address": "Vital 1", "floor": "2", "square_meters": 70,
                 "publish_date": "2024-05-01T08:00:00", "link": "https://example.com/1", "images": []}]"#
                .to_string(),
        ),
        ("POST", "/scrape") => (
            200,
            r#"{"success": true, "message": "Scraping started in background", "apartments_found": 0, "new_apartments": 0}"#
                .to_string(),
        ),
        ("GET", "/scrape/status") => (200, r#"{"is_scraping": false}"#.to_string()),
        _ => (404, r#"{"detail": "Not Found"}"#.to_string()),
    }
}

fn client_with_session(base_url: &str, session: Option<Session>) -> (ApiClient, Arc<CountingNavigator>) {
    let navigator = Arc::new(CountingNavigator::default());
    let guard = SessionGuard::new(Database::open_in_memory().unwrap(), navigator.clone());
    if let Some(session) = session {
        guard.replace(session).unwrap();
    }
    let client = ApiClient::new(base_url, Duration::from_secs(5), guard).unwrap();
    (client, navigator)
}

#[tokio::test]
async fn requests_carry_bearer_token() {
    let server = api_server::start(backend);
    let (client, navigator) =
        client_with_session(&server.base_url, Some(Session::new("tok-123".to_string())));

    let neighborhoods = client.neighborhoods().await.unwrap();
    assert_eq!(neighborhoods.len(), 2);
    assert_eq!(neighborhoods[0].name, "Florentin");

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.active_apartments, 25);
    assert!(stats.last_scrape.is_some());

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.authorization.as_deref(), Some("Bearer tok-123"));
    }
    assert_eq!(navigator.redirects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn filters_become_query_parameters() {
    let server = api_server::start(backend);
    let (client, _) = client_with_session(&server.base_url, Some(Session::new("t".to_string())));

    let filters = ListingFilters {
        neighborhood: Some("204".to_string()),
        max_price: Some(8000),
        room_count: Some(3.0),
    };
    let apartments = client.apartments(&filters).await.unwrap();
    assert_eq!(apartments.len(), 1);
    assert_eq!(apartments[0].square_meters, Some(70));

    let requests = server.requests();
    assert_eq!(
        requests[0].path,
        "/apartments?neighborhood_id=204&max_price=8000&min_rooms=3&max_rooms=3"
    );

    client.apartments(&ListingFilters::default()).await.unwrap();
    assert_eq!(server.requests()[1].path, "/apartments");
}

#[tokio::test]
async fn scrape_endpoints() {
    let server = api_server::start(backend);
    let (client, _) = client_with_session(&server.base_url, Some(Session::new("t".to_string())));

    let status = client.scrape_status().await.unwrap();
    assert!(!status.is_scraping);

    let started = client.start_scrape().await.unwrap();
    assert!(started.success);
    assert_eq!(started.message.as_deref(), Some("Scraping started in background"));

    let methods: Vec<String> = server.requests().into_iter().map(|r| r.method).collect();
    assert_eq!(methods, vec!["GET".to_string(), "POST".to_string()]);
}

#[tokio::test]
async fn expired_session_never_reaches_the_network() {
    let server = api_server::start(backend);
    let issued_25h_ago =
        chrono::Utc::now().timestamp_millis() - 25 * 60 * 60 * 1000;
    let (client, navigator) = client_with_session(
        &server.base_url,
        Some(Session::issued_at("stale".to_string(), issued_25h_ago)),
    );

    assert!(matches!(client.stats().await, Err(ApiError::AuthExpired)));
    assert!(matches!(client.start_scrape().await, Err(ApiError::AuthExpired)));
    assert!(matches!(client.scrape_status().await, Err(ApiError::AuthExpired)));

    assert!(server.requests().is_empty());
    assert_eq!(navigator.redirects.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn missing_session_never_reaches_the_network() {
    let server = api_server::start(backend);
    let (client, navigator) = client_with_session(&server.base_url, None);

    assert!(client.neighborhoods().await.unwrap_err().is_auth_expired());
    assert!(server.requests().is_empty());
    assert_eq!(navigator.redirects.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unauthorized_response_invalidates_session() {
    let server = api_server::start(|_, _| (401, r#"{"detail": "Invalid or expired token"}"#.to_string()));
    let (client, navigator) = client_with_session(&server.base_url, Some(Session::new("revoked".to_string())));

    assert!(matches!(client.stats().await, Err(ApiError::AuthExpired)));
    assert_eq!(navigator.redirects.load(Ordering::SeqCst), 1);
    assert_eq!(client.guard().stored_session().unwrap(), None);

    // The cleared session stops the next call before it is sent
    assert!(matches!(client.stats().await, Err(ApiError::AuthExpired)));
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn http_errors_are_surfaced() {
    let server = api_server::start(backend);
    let (client, _) = client_with_session(&server.base_url, Some(Session::new("t".to_string())));

    match client.apartment(99).await {
        Err(ApiError::Http { status, body }) => {
            assert_eq!(status, 404);
            assert!(body.contains("Apartment not found"));
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    // Bind and drop to get a port nobody listens on
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let (client, _) = client_with_session(
        &format!("http://127.0.0.1:{port}/api"),
        Some(Session::new("t".to_string())),
    );

    assert!(matches!(client.scrape_status().await, Err(ApiError::Network(_))));
}
