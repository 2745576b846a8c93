//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] aptfinder_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] aptfinder_session::SessionError),

    #[error("API error: {0}")]
    Api(#[from] aptfinder_api::ApiError),

    #[error("Job error: {0}")]
    Job(#[from] aptfinder_jobs::JobError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CoreError {
    /// The session was missing, expired or rejected; the login redirect has
    /// already happened.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            CoreError::Api(e) => e.is_auth_expired(),
            CoreError::Job(aptfinder_jobs::JobError::AuthExpired) => true,
            CoreError::Job(aptfinder_jobs::JobError::Api(e)) => e.is_auth_expired(),
            CoreError::Session(aptfinder_session::SessionError::Expired) => true,
            _ => false,
        }
    }
}
