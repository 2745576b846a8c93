//! Session Guard
//!
//! Validates the stored credential on every protected action. Outbound
//! requests must take their headers from [`SessionGuard::authorized_headers`]
//! so the expiry check cannot be skipped.

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::sync::Arc;
use std::time::Duration;

use aptfinder_storage::Database;

use crate::error::SessionError;
use crate::session::{Session, SESSION_TTL_MS};
use crate::Result;

pub const DEFAULT_LOGIN_PATH: &str = "./login.html";

const TOKEN_KEY: &str = "auth_token";
const ISSUED_AT_KEY: &str = "auth_time";

/// Source of the current time in epoch milliseconds
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Performs the navigation side effect when the session is unusable
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Valid,
    Invalid,
}

impl SessionStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, SessionStatus::Valid)
    }
}

pub struct SessionGuard {
    /// Persistent storage for the token and issuance time
    db: Database,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    /// Login entry point used for redirects
    login_path: String,
    ttl_ms: i64,
}

impl SessionGuard {
    pub fn new(db: Database, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            db,
            clock: Arc::new(SystemClock),
            navigator,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            ttl_ms: SESSION_TTL_MS,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_login_path(mut self, login_path: impl Into<String>) -> Self {
        self.login_path = login_path.into();
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// Read the stored session without validating it.
    ///
    /// A missing token, a missing timestamp or a timestamp that is not an
    /// integer all read as "no session".
    pub fn stored_session(&self) -> Result<Option<Session>> {
        let Some(token) = self.db.get_setting(TOKEN_KEY)? else {
            return Ok(None);
        };
        let Some(issued_at) = self.db.get_setting(ISSUED_AT_KEY)? else {
            return Ok(None);
        };

        match issued_at.trim().parse::<i64>() {
            Ok(issued_at_ms) => Ok(Some(Session::issued_at(token, issued_at_ms))),
            Err(_) => {
                tracing::warn!(value = %issued_at, "Stored session timestamp is not a number");
                Ok(None)
            }
        }
    }

    /// Validate the stored session, redirecting to login when it is unusable.
    pub fn check_session(&self) -> SessionStatus {
        match self.valid_session() {
            Some(_) => SessionStatus::Valid,
            None => SessionStatus::Invalid,
        }
    }

    /// Headers for an authenticated request.
    ///
    /// Fails with [`SessionError::Expired`] after performing the login
    /// redirect; the caller must abort without sending anything.
    pub fn authorized_headers(&self) -> Result<HeaderMap> {
        let session = self.valid_session().ok_or(SessionError::Expired)?;

        let bearer = match HeaderValue::from_str(&format!("Bearer {}", session.token)) {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Stored token cannot be sent as a header");
                self.invalidate();
                return Err(SessionError::Expired);
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    /// Store a session obtained from an external login flow, replacing any
    /// previous one.
    pub fn replace(&self, session: Session) -> Result<()> {
        let issued_at = session.issued_at_ms.to_string();
        self.db
            .set_settings(&[(TOKEN_KEY, &session.token), (ISSUED_AT_KEY, &issued_at)])?;

        tracing::info!(issued_at_ms = session.issued_at_ms, "Stored new session");

        Ok(())
    }

    /// Store `token` as a session issued now
    pub fn sign_in(&self, token: impl Into<String>) -> Result<Session> {
        let session = Session::issued_at(token.into(), self.clock.now_millis());
        self.replace(session.clone())?;
        Ok(session)
    }

    /// Clear the session and go to the login page. Safe to call repeatedly.
    pub fn logout(&self) -> Result<()> {
        let cleared = self.clear();
        self.navigator.navigate(&self.login_path);

        tracing::info!("Logged out");

        cleared
    }

    /// Drop a session the server no longer accepts and redirect to login.
    pub fn invalidate(&self) {
        if let Err(e) = self.clear() {
            tracing::error!("Failed to clear session: {}", e);
        }
        self.navigator.navigate(&self.login_path);
    }

    fn clear(&self) -> Result<()> {
        self.db.delete_settings(&[TOKEN_KEY, ISSUED_AT_KEY])?;
        Ok(())
    }

    fn valid_session(&self) -> Option<Session> {
        let stored = match self.stored_session() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::error!("Failed to read session: {}", e);
                None
            }
        };

        let now_ms = self.clock.now_millis();
        match stored {
            Some(session) if session.is_valid_at(now_ms, self.ttl_ms) => Some(session),
            Some(session) => {
                tracing::info!(age_ms = session.age_ms(now_ms), "Session expired");
                self.invalidate();
                None
            }
            None => {
                tracing::debug!("No session stored");
                self.navigator.navigate(&self.login_path);
                None
            }
        }
    }
}

impl Clone for SessionGuard {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            clock: Arc::clone(&self.clock),
            navigator: Arc::clone(&self.navigator),
            login_path: self.login_path.clone(),
            ttl_ms: self.ttl_ms,
        }
    }
}
