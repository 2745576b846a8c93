//! Aptfinder Session Guard
//!
//! - A Session is an opaque bearer token plus the time it was issued
//! - A session is valid for 24 hours from issuance
//! - Every protected action checks validity first; an invalid session
//!   redirects to the login page and aborts the action
//! - Sessions are replaced wholesale on re-login, never edited in place

mod error;
mod guard;
mod session;

pub use error::SessionError;
pub use guard::{Clock, Navigator, SessionGuard, SessionStatus, SystemClock, DEFAULT_LOGIN_PATH};
pub use session::{Session, SESSION_TTL_MS};

pub type Result<T> = std::result::Result<T, SessionError>;
