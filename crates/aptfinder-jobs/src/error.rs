//! Job error types

use aptfinder_api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("A scrape is already starting or running")]
    AlreadyInFlight,

    #[error("Session expired")]
    AuthExpired,

    #[error("Scrape request declined: {0}")]
    StartRejected(String),

    #[error("API error: {0}")]
    Api(#[from] ApiError),
}
