//! Aptfinder Job Orchestration
//!
//! Drives the backend scrape job:
//! - At most one job in flight per poller
//! - Remote status is checked before starting, so a job started elsewhere
//!   is never duplicated
//! - Completion is detected by polling and reported exactly once
//! - While a job is in flight the suppress signal is raised so periodic
//!   listing reloads stay out of the way

mod error;
mod feedback;
mod poller;
mod signal;
mod state;

pub use error::JobError;
pub use feedback::{Notice, NoticeLevel, Notifier, TriggerControl};
pub use poller::{JobId, JobPoller, JobSnapshot, TriggerOutcome, DEFAULT_POLL_INTERVAL};
pub use signal::SuppressSignal;
pub use state::JobState;

pub type Result<T> = std::result::Result<T, JobError>;
