//! Aptfinder Core
//!
//! Coordination layer for the listings dashboard. The rendering layer only
//! implements the view traits; all state lives here.

mod config;
mod dashboard;
mod error;
mod format;
mod view;
mod view_sync;

pub use config::Config;
pub use dashboard::{Dashboard, DashboardUi};
pub use error::CoreError;
pub use format::{format_price, time_ago};
pub use view::ListingView;
pub use view_sync::{TickReport, ViewSync, DEFAULT_REFRESH_INTERVAL};

// Re-export core components
pub use aptfinder_api::{
    Apartment, ApiClient, ApiError, ListingFilters, ListingsApi, Neighborhood, ScrapeApi, Stats,
};
pub use aptfinder_jobs::{
    JobError, JobId, JobPoller, JobState, Notice, NoticeLevel, Notifier, SuppressSignal,
    TriggerControl, TriggerOutcome,
};
pub use aptfinder_routing::{rewrite_path, EdgeRouter, RouteResolution};
pub use aptfinder_session::{Navigator, Session, SessionError, SessionGuard, SessionStatus};
pub use aptfinder_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
