//! Periodic stats and listings refresh
//!
//! Loads neighborhoods, stats and listings once, then refreshes on a fixed
//! interval. Stats are refreshed on every tick; listings are skipped while a
//! scrape is in flight so the grid does not churn under a half-written
//! dataset. Explicit refreshes (filter changes, scrape completion) are never
//! skipped.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use aptfinder_api::{ApiError, ListingFilters, ListingsApi};
use aptfinder_jobs::SuppressSignal;

use crate::view::ListingView;
use crate::Result;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(30_000);

/// What one timer tick refreshed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub stats_refreshed: bool,
    pub listings_refreshed: bool,
    /// Listings were skipped because a scrape was in flight
    pub listings_suppressed: bool,
}

/// The armed refresh timer
struct RefreshCycle {
    task: JoinHandle<()>,
    armed_at: DateTime<Utc>,
}

impl RefreshCycle {
    fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    fn cancel(self) {
        self.task.abort();
    }
}

pub struct ViewSync {
    api: Arc<dyn ListingsApi>,
    view: Arc<dyn ListingView>,
    /// Raised by the job poller while a scrape is in flight
    suppress: SuppressSignal,
    filters: Arc<RwLock<ListingFilters>>,
    /// Bumped per listings request; only the newest response is rendered
    listing_generation: Arc<AtomicU64>,
    cycle: Arc<Mutex<Option<RefreshCycle>>>,
    refresh_interval: Duration,
}

impl ViewSync {
    pub fn new(
        api: Arc<dyn ListingsApi>,
        view: Arc<dyn ListingView>,
        suppress: SuppressSignal,
    ) -> Self {
        Self {
            api,
            view,
            suppress,
            filters: Arc::new(RwLock::new(ListingFilters::default())),
            listing_generation: Arc::new(AtomicU64::new(0)),
            cycle: Arc::new(Mutex::new(None)),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    pub fn with_refresh_interval(mut self, refresh_interval: Duration) -> Self {
        self.refresh_interval = refresh_interval;
        self
    }

    pub fn current_filters(&self) -> ListingFilters {
        self.filters.read().clone()
    }

    /// Initial load, then arm the refresh timer.
    ///
    /// Neighborhoods, stats and listings load strictly in that order. A
    /// failed step is logged and the next one still runs; an expired
    /// session stops the load and leaves the timer unarmed.
    pub async fn initialize(&self) -> Result<()> {
        absorb("neighborhoods", self.load_neighborhoods().await)?;
        absorb("stats", self.refresh_stats().await)?;
        absorb("listings", self.refresh_listings().await)?;

        self.start();

        tracing::info!("Dashboard data loaded");

        Ok(())
    }

    /// Arm the refresh timer, replacing any existing one
    fn start(&self) {
        let mut cycle = self.cycle.lock();
        if let Some(previous) = cycle.take() {
            previous.cancel();
        }

        let sync = self.clone();
        let task = tokio::spawn(async move {
            sync.run_cycle().await;
        });

        *cycle = Some(RefreshCycle {
            task,
            armed_at: Utc::now(),
        });

        tracing::debug!(interval_ms = self.refresh_interval.as_millis() as u64, "Refresh timer armed");
    }

    /// Tear the refresh timer down
    pub fn stop(&self) {
        if let Some(cycle) = self.cycle.lock().take() {
            tracing::debug!(armed_at = %cycle.armed_at, "Refresh timer stopped");
            cycle.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.cycle.lock().as_ref().is_some_and(RefreshCycle::is_active)
    }

    /// One timer tick. Only an expired session is returned as an error.
    pub async fn tick(&self) -> Result<TickReport> {
        let stats_refreshed = absorb("stats", self.refresh_stats().await)?;

        if self.suppress.is_set() {
            tracing::debug!("Scrape in flight, skipping listing refresh");
            return Ok(TickReport {
                stats_refreshed,
                listings_refreshed: false,
                listings_suppressed: true,
            });
        }

        let listings_refreshed = absorb("listings", self.refresh_listings().await)?;

        Ok(TickReport {
            stats_refreshed,
            listings_refreshed,
            listings_suppressed: false,
        })
    }

    /// Replace the filters and reload listings immediately
    pub async fn set_filters(&self, filters: ListingFilters) -> Result<()> {
        tracing::info!(
            neighborhood = ?filters.neighborhood,
            max_price = ?filters.max_price,
            rooms = ?filters.room_count,
            "Filters changed"
        );
        *self.filters.write() = filters;

        absorb("listings", self.refresh_listings().await)?;
        Ok(())
    }

    /// Reload stats and listings regardless of the suppress signal
    pub async fn refresh_all(&self) -> Result<()> {
        absorb("stats", self.refresh_stats().await)?;
        absorb("listings", self.refresh_listings().await)?;
        Ok(())
    }

    async fn run_cycle(&self) {
        let start = Instant::now() + self.refresh_interval;
        let mut ticker = tokio::time::interval_at(start, self.refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.tick().await {
                Ok(report) => tracing::debug!(
                    stats = report.stats_refreshed,
                    listings = report.listings_refreshed,
                    suppressed = report.listings_suppressed,
                    "Refresh tick"
                ),
                Err(e) => {
                    tracing::info!("Stopping refresh timer: {}", e);
                    return;
                }
            }
        }
    }

    async fn load_neighborhoods(&self) -> aptfinder_api::Result<()> {
        let neighborhoods = self.api.neighborhoods().await?;
        tracing::debug!(count = neighborhoods.len(), "Loaded neighborhoods");
        self.view.show_neighborhoods(&neighborhoods);
        Ok(())
    }

    async fn refresh_stats(&self) -> aptfinder_api::Result<()> {
        let stats = self.api.stats().await?;
        self.view.show_stats(&stats);
        Ok(())
    }

    async fn refresh_listings(&self) -> aptfinder_api::Result<()> {
        let filters = self.current_filters();
        let generation = self.listing_generation.fetch_add(1, Ordering::SeqCst) + 1;

        self.view.set_loading(true);
        let result = self.api.apartments(&filters).await;

        if self.listing_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, "Dropping superseded listings response");
            return result.map(|_| ());
        }
        self.view.set_loading(false);

        match result {
            Ok(apartments) => {
                tracing::debug!(count = apartments.len(), "Loaded listings");
                self.view.show_listings(&apartments);
                Ok(())
            }
            Err(e) => {
                if !e.is_auth_expired() {
                    self.view.show_listing_error(&e);
                }
                Err(e)
            }
        }
    }
}

impl Clone for ViewSync {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            view: Arc::clone(&self.view),
            suppress: self.suppress.clone(),
            filters: Arc::clone(&self.filters),
            listing_generation: Arc::clone(&self.listing_generation),
            cycle: Arc::clone(&self.cycle),
            refresh_interval: self.refresh_interval,
        }
    }
}

/// Log and swallow a failed load; an expired session is passed up.
fn absorb(what: &str, result: aptfinder_api::Result<()>) -> Result<bool> {
    match result {
        Ok(()) => Ok(true),
        Err(e) if e.is_auth_expired() => Err(e.into()),
        Err(e) => {
            tracing::warn!(what, "Refresh failed: {}", e);
            Ok(false)
        }
    }
}
