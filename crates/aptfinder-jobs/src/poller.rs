//! Scrape job poller
//!
//! Starts the backend scrape, refuses to start a second one while the first
//! is in flight, and polls `GET /scrape/status` until the backend reports the
//! job finished.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use aptfinder_api::{ApiError, ScrapeApi};

use crate::error::JobError;
use crate::feedback::{Notice, Notifier, TriggerControl};
use crate::signal::SuppressSignal;
use crate::state::JobState;
use crate::Result;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);

const ALREADY_RUNNING_MESSAGE: &str = "A scrape is already in progress, please wait...";
const COMPLETED_MESSAGE: &str = "Scrape completed successfully!";

/// Identifies one scrape run in logs and completion callbacks
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The backend accepted the start; polling has begun
    Started(JobId),
    /// The backend was already scraping; nothing was submitted
    AlreadyRunning,
}

/// Point-in-time view of the poller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub state: JobState,
    pub job_id: Option<JobId>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

type CompletionCallback = Arc<dyn Fn(&JobId) + Send + Sync>;

#[derive(Default)]
struct PollerInner {
    state: JobState,
    job_id: Option<JobId>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    /// The single polling task; only present while Running
    poll_task: Option<JoinHandle<()>>,
}

pub struct JobPoller {
    api: Arc<dyn ScrapeApi>,
    /// Job state and timer handle; mutated only by this type
    inner: Arc<Mutex<PollerInner>>,
    control: Arc<dyn TriggerControl>,
    notifier: Arc<dyn Notifier>,
    suppress: Arc<watch::Sender<bool>>,
    on_complete: Arc<RwLock<Option<CompletionCallback>>>,
    poll_interval: Duration,
}

impl JobPoller {
    pub fn new(
        api: Arc<dyn ScrapeApi>,
        control: Arc<dyn TriggerControl>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (suppress, _) = watch::channel(false);
        control.set_enabled(true);

        Self {
            api,
            inner: Arc::new(Mutex::new(PollerInner::default())),
            control,
            notifier,
            suppress: Arc::new(suppress),
            on_complete: Arc::new(RwLock::new(None)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Register the callback run once per completed job.
    ///
    /// Replaces any previously registered callback.
    pub fn on_complete<F>(&self, callback: F)
    where
        F: Fn(&JobId) + Send + Sync + 'static,
    {
        *self.on_complete.write() = Some(Arc::new(callback));
    }

    pub fn state(&self) -> JobState {
        self.inner.lock().state.clone()
    }

    pub fn snapshot(&self) -> JobSnapshot {
        let inner = self.inner.lock();
        JobSnapshot {
            state: inner.state.clone(),
            job_id: inner.job_id.clone(),
            started_at: inner.started_at,
            finished_at: inner.finished_at,
        }
    }

    /// Whether the polling timer is armed
    pub fn is_polling(&self) -> bool {
        self.inner.lock().poll_task.is_some()
    }

    /// Signal raised while a job is Starting or Running
    pub fn suppress_signal(&self) -> SuppressSignal {
        SuppressSignal::new(self.suppress.subscribe())
    }

    /// Start a scrape unless one is already in flight.
    ///
    /// Every error has already been surfaced through the notifier (or, for
    /// an expired session, through the login redirect) when this returns.
    pub async fn trigger(&self) -> Result<TriggerOutcome> {
        let job_id = {
            let mut inner = self.inner.lock();
            if inner.state.is_in_flight() {
                tracing::info!(state = %inner.state, "Scrape already in flight, ignoring trigger");
                return Err(JobError::AlreadyInFlight);
            }

            let job_id = JobId::new();
            inner.job_id = Some(job_id.clone());
            inner.started_at = Some(Utc::now());
            inner.finished_at = None;
            self.transition(&mut inner, JobState::Starting);
            job_id
        };
        let _starting = StartingGuard {
            poller: self,
            job_id: job_id.clone(),
        };

        tracing::info!(job_id = %job_id, "Checking remote scrape status");

        // Never submit a start while the backend is already scraping,
        // e.g. one started from another page load.
        match self.api.scrape_status().await {
            Ok(status) if status.is_scraping => {
                tracing::info!(job_id = %job_id, "Backend is already scraping");
                self.settle(JobState::Idle);
                self.notifier.notify(Notice::info(ALREADY_RUNNING_MESSAGE));
                return Ok(TriggerOutcome::AlreadyRunning);
            }
            Ok(_) => {}
            Err(e) => return Err(self.fail_start(&job_id, e)),
        }

        let response = match self.api.start_scrape().await {
            Ok(response) => response,
            Err(e) => return Err(self.fail_start(&job_id, e)),
        };

        if !response.success {
            let message = response
                .message
                .unwrap_or_else(|| "Scrape request was declined".to_string());
            tracing::warn!(job_id = %job_id, message = %message, "Backend declined scrape");
            self.settle(JobState::Failed(message.clone()));
            self.notifier.notify(Notice::error(message.clone()));
            return Err(JobError::StartRejected(message));
        }

        {
            let mut inner = self.inner.lock();
            self.transition(&mut inner, JobState::Running);
            // Spawned under the lock so the task cannot observe a missing handle
            self.arm_polling(&mut inner, job_id.clone());
        }

        tracing::info!(job_id = %job_id, "Scrape started");

        Ok(TriggerOutcome::Started(job_id))
    }

    fn fail_start(&self, job_id: &JobId, error: ApiError) -> JobError {
        if error.is_auth_expired() {
            // The guard has already redirected to login
            tracing::info!(job_id = %job_id, "Session expired while starting scrape");
            self.settle(JobState::Idle);
            return JobError::AuthExpired;
        }

        let reason = error.to_string();
        tracing::warn!(job_id = %job_id, error = %reason, "Failed to start scrape");
        self.settle(JobState::Failed(reason.clone()));
        self.notifier
            .notify(Notice::error(format!("Failed to start scrape: {reason}")));
        JobError::Api(error)
    }

    fn arm_polling(&self, inner: &mut PollerInner, job_id: JobId) {
        if let Some(stale) = inner.poll_task.take() {
            tracing::error!("Polling timer was still armed; cancelling it");
            stale.abort();
        }

        let poller = self.clone();
        inner.poll_task = Some(tokio::spawn(async move {
            poller.poll_until_done(job_id).await;
        }));
    }

    async fn poll_until_done(&self, job_id: JobId) {
        let start = Instant::now() + self.poll_interval;
        let mut ticker = tokio::time::interval_at(start, self.poll_interval);
        // Each tick awaits its request, so ticks never overlap
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.api.scrape_status().await {
                Ok(status) if status.is_scraping => {
                    tracing::debug!(job_id = %job_id, "Scrape still running");
                }
                Ok(_) => {
                    self.complete(&job_id);
                    return;
                }
                Err(e) if e.is_auth_expired() => {
                    tracing::info!(job_id = %job_id, "Session expired while polling");
                    self.settle(JobState::Idle);
                    return;
                }
                Err(e) => {
                    // No timeout: keep polling until the backend answers
                    tracing::warn!(job_id = %job_id, "Status poll failed: {}", e);
                }
            }
        }
    }

    fn complete(&self, job_id: &JobId) {
        self.settle(JobState::Completed);

        tracing::info!(job_id = %job_id, "Scrape completed");

        let callback = self.on_complete.read().clone();
        if let Some(callback) = callback {
            callback(job_id);
        }
        self.notifier.notify(Notice::success(COMPLETED_MESSAGE));
    }

    /// Move to a state outside the in-flight pair, dropping the timer handle
    fn settle(&self, state: JobState) {
        let mut inner = self.inner.lock();
        inner.poll_task = None;
        inner.finished_at = Some(Utc::now());
        self.transition(&mut inner, state);
    }

    fn transition(&self, inner: &mut PollerInner, to: JobState) {
        debug_assert!(
            inner.state.can_transition_to(&to),
            "invalid job transition {} -> {}",
            inner.state,
            to
        );

        tracing::debug!(from = %inner.state, to = %to, "Job state transition");

        let in_flight = to.is_in_flight();
        inner.state = to;
        self.suppress.send_replace(in_flight);
        self.control.set_enabled(!in_flight);
    }
}

/// Returns the poller to Idle if a trigger is dropped mid-start
struct StartingGuard<'a> {
    poller: &'a JobPoller,
    job_id: JobId,
}

impl Drop for StartingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.poller.inner.lock();
        if inner.state != JobState::Starting || inner.job_id.as_ref() != Some(&self.job_id) {
            return;
        }

        tracing::info!(job_id = %self.job_id, "Scrape trigger abandoned while starting");
        inner.finished_at = Some(Utc::now());
        self.poller.transition(&mut inner, JobState::Idle);
    }
}

impl Clone for JobPoller {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            inner: Arc::clone(&self.inner),
            control: Arc::clone(&self.control),
            notifier: Arc::clone(&self.notifier),
            suppress: Arc::clone(&self.suppress),
            on_complete: Arc::clone(&self.on_complete),
            poll_interval: self.poll_interval,
        }
    }
}
