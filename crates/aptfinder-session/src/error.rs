//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session expired or missing")]
    Expired,

    #[error("Storage error: {0}")]
    Storage(#[from] aptfinder_storage::StorageError),
}
