//! Aptfinder Storage Layer
//!
//! SQLite-backed persistence for the little state the client keeps locally:
//! the session token and its issuance time.

mod database;
mod error;
mod migrations;

pub use database::Database;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
