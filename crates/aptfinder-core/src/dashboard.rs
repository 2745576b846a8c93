//! Dashboard state container
//!
//! Owns the session guard, job poller and refresh loop for one page. The
//! front-end only implements the [`DashboardUi`] traits and forwards user
//! actions here.

use std::sync::Arc;

use aptfinder_api::{Apartment, ApiClient, ListingFilters, ListingsApi, ScrapeApi};
use aptfinder_jobs::{JobPoller, JobSnapshot, JobState, Notifier, TriggerControl, TriggerOutcome};
use aptfinder_routing::{EdgeRouter, RouteResolution};
use aptfinder_session::{Navigator, Session, SessionGuard, SessionStatus};
use aptfinder_storage::Database;

use crate::config::Config;
use crate::view::ListingView;
use crate::view_sync::ViewSync;
use crate::Result;

/// Rendering and navigation surfaces supplied by the front-end
#[derive(Clone)]
pub struct DashboardUi {
    pub view: Arc<dyn ListingView>,
    pub notifier: Arc<dyn Notifier>,
    pub control: Arc<dyn TriggerControl>,
    pub navigator: Arc<dyn Navigator>,
}

pub struct Dashboard {
    config: Config,
    guard: SessionGuard,
    api: Arc<dyn ListingsApi>,
    poller: JobPoller,
    view_sync: ViewSync,
    router: EdgeRouter,
}

impl Dashboard {
    /// Open the database and connect to the configured backend
    pub fn new(config: Config, ui: DashboardUi) -> Result<Self> {
        config.validate()?;

        let db = Database::open(&config.database_path)?;
        let guard = SessionGuard::new(db, Arc::clone(&ui.navigator))
            .with_login_path(config.login_path.clone())
            .with_ttl(config.session_ttl());
        let client = ApiClient::new(&config.api_base_url, config.request_timeout(), guard.clone())?;

        tracing::info!(api = %client.base_url(), "Dashboard created");

        let client = Arc::new(client);
        Ok(Self::with_backend(config, guard, client.clone(), client, ui))
    }

    /// Wire the dashboard around explicit backend implementations
    pub fn with_backend(
        config: Config,
        guard: SessionGuard,
        listings: Arc<dyn ListingsApi>,
        scrape: Arc<dyn ScrapeApi>,
        ui: DashboardUi,
    ) -> Self {
        let poller = JobPoller::new(scrape, ui.control, ui.notifier)
            .with_poll_interval(config.poll_interval());
        let view_sync = ViewSync::new(Arc::clone(&listings), ui.view, poller.suppress_signal())
            .with_refresh_interval(config.refresh_interval());

        // Completed scrape: one-off refresh of everything
        let sync = view_sync.clone();
        poller.on_complete(move |job_id| {
            let sync = sync.clone();
            let job_id = job_id.clone();
            tokio::spawn(async move {
                if let Err(e) = sync.refresh_all().await {
                    tracing::warn!(job_id = %job_id, "Post-scrape refresh failed: {}", e);
                }
            });
        });

        let router = EdgeRouter::with_login_page(absolute_page(&config.login_path));

        Self {
            config,
            guard,
            api: listings,
            poller,
            view_sync,
            router,
        }
    }

    /// Page load: validate the session, then load data and arm the timer.
    ///
    /// Returns [`SessionStatus::Invalid`] after redirecting when there is no
    /// usable session; nothing is loaded in that case.
    pub async fn load(&self) -> Result<SessionStatus> {
        let status = self.guard.check_session();
        if !status.is_valid() {
            tracing::info!("No valid session, dashboard not loaded");
            return Ok(status);
        }

        self.view_sync.initialize().await?;
        Ok(status)
    }

    // === User actions ===

    pub async fn scrape(&self) -> Result<TriggerOutcome> {
        Ok(self.poller.trigger().await?)
    }

    pub async fn apply_filters(&self, filters: ListingFilters) -> Result<()> {
        self.view_sync.set_filters(filters).await
    }

    pub fn filters(&self) -> ListingFilters {
        self.view_sync.current_filters()
    }

    pub async fn refresh(&self) -> Result<()> {
        self.view_sync.refresh_all().await
    }

    pub async fn apartment(&self, id: i64) -> Result<Apartment> {
        Ok(self.api.apartment(id).await?)
    }

    /// Store a token obtained from the login flow
    pub fn login(&self, token: &str) -> Result<Session> {
        Ok(self.guard.sign_in(token)?)
    }

    pub fn logout(&self) -> Result<()> {
        self.view_sync.stop();
        self.guard.logout()?;
        Ok(())
    }

    pub fn route(&self, path: &str) -> RouteResolution {
        self.router.resolve(path)
    }

    /// Stop background refreshes
    pub fn shutdown(&self) {
        self.view_sync.stop();
    }

    // === State ===

    pub fn job_state(&self) -> JobState {
        self.poller.state()
    }

    pub fn job_snapshot(&self) -> JobSnapshot {
        self.poller.snapshot()
    }

    pub fn is_refreshing(&self) -> bool {
        self.view_sync.is_running()
    }

    pub fn session_guard(&self) -> &SessionGuard {
        &self.guard
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Clone for Dashboard {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            guard: self.guard.clone(),
            api: Arc::clone(&self.api),
            poller: self.poller.clone(),
            view_sync: self.view_sync.clone(),
            router: self.router.clone(),
        }
    }
}

/// `./login.html` as a site path: `/login.html`
fn absolute_page(path: &str) -> String {
    let trimmed = path.trim_start_matches('.').trim_start_matches('/');
    format!("/{trimmed}")
}
