//! Session data structure

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// How long a session stays valid after issuance (24 hours).
pub const SESSION_TTL_MS: i64 = 86_400_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque bearer token
    pub token: String,
    /// Issuance time in epoch milliseconds
    pub issued_at_ms: i64,
}

impl Session {
    /// Create a session issued right now
    pub fn new(token: String) -> Self {
        Self::issued_at(token, Utc::now().timestamp_millis())
    }

    pub fn issued_at(token: String, issued_at_ms: i64) -> Self {
        Self {
            token,
            issued_at_ms,
        }
    }

    /// Milliseconds elapsed since issuance
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.issued_at_ms)
    }

    /// Valid iff the token is non-empty and the session is no older than `ttl_ms`.
    pub fn is_valid_at(&self, now_ms: i64, ttl_ms: i64) -> bool {
        !self.token.is_empty() && self.age_ms(now_ms) <= ttl_ms
    }

    pub fn issued_at_utc(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.issued_at_ms).single()
    }

    pub fn expires_at_utc(&self, ttl_ms: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.issued_at_ms.saturating_add(ttl_ms))
            .single()
    }
}
