//! Scrape job state machine
//!
//! ```text
//! Idle ──trigger──▶ Starting ──ack──▶ Running ──done──▶ Completed
//!                     │   │              │                  │
//!                     │   └─fail──▶ Failed                  │
//!                     └─already running / expired──▶ Idle   │
//! Completed, Failed ──trigger──▶ Starting ◀─────────────────┘
//! ```

use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum JobState {
    /// No job requested yet
    #[default]
    Idle,
    /// Pre-check and start request in progress
    Starting,
    /// Backend acknowledged the start; polling for completion
    Running,
    /// Backend reported the job finished
    Completed,
    /// The start request failed or was declined
    Failed(String),
}

impl JobState {
    /// Check if transition to another state is valid
    pub fn can_transition_to(&self, target: &JobState) -> bool {
        match (self, target) {
            // A new job can start from any settled state
            (JobState::Idle | JobState::Completed | JobState::Failed(_), JobState::Starting) => {
                true
            }
            // Already running remotely, or the session expired mid-start
            (JobState::Starting, JobState::Idle) => true,
            (JobState::Starting, JobState::Running) => true,
            (JobState::Starting, JobState::Failed(_)) => true,
            (JobState::Running, JobState::Completed) => true,
            // Session expired while polling
            (JobState::Running, JobState::Idle) => true,
            _ => false,
        }
    }

    /// Starting or Running
    pub fn is_in_flight(&self) -> bool {
        matches!(self, JobState::Starting | JobState::Running)
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match self {
            JobState::Failed(reason) => Some(reason),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Starting => "starting",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_transitions() {
        assert!(JobState::Idle.can_transition_to(&JobState::Starting));
        assert!(JobState::Starting.can_transition_to(&JobState::Running));
        assert!(JobState::Starting.can_transition_to(&JobState::Idle));
        assert!(JobState::Starting.can_transition_to(&JobState::Failed("x".into())));
        assert!(JobState::Running.can_transition_to(&JobState::Completed));
        // Re-armable after settling
        assert!(JobState::Completed.can_transition_to(&JobState::Starting));
        assert!(JobState::Failed("x".into()).can_transition_to(&JobState::Starting));
    }

    #[test]
    fn test_invalid_transitions() {
        // No second start while one is in flight
        assert!(!JobState::Starting.can_transition_to(&JobState::Starting));
        assert!(!JobState::Running.can_transition_to(&JobState::Starting));
        // Completion only comes from polling
        assert!(!JobState::Idle.can_transition_to(&JobState::Completed));
        assert!(!JobState::Starting.can_transition_to(&JobState::Completed));
        // Polling never fails the job
        assert!(!JobState::Running.can_transition_to(&JobState::Failed("x".into())));
    }

    #[test]
    fn test_in_flight() {
        assert!(!JobState::Idle.is_in_flight());
        assert!(JobState::Starting.is_in_flight());
        assert!(JobState::Running.is_in_flight());
        assert!(!JobState::Completed.is_in_flight());
        assert!(!JobState::Failed("boom".into()).is_in_flight());
        assert_eq!(JobState::Failed("boom".into()).failure_reason(), Some("boom"));
    }
}
