//! Application state management
use aptfinder_core::{Config, Dashboard, DashboardUi, Result, SessionStatus};
use std::sync::Arc;

use crate::terminal::Terminal;

/// The dashboard plus the terminal it renders to
pub struct AppState {
    dashboard: Dashboard,
    terminal: Arc<Terminal>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let terminal = Arc::new(Terminal::new());
        let ui = DashboardUi {
            view: terminal.clone(),
            notifier: terminal.clone(),
            control: terminal.clone(),
            navigator: terminal.clone(),
        };
        let dashboard = Dashboard::new(config, ui)?;

        Ok(Self {
            dashboard,
            terminal,
        })
    }

    /// Page load; a missing session leaves the terminal at the login prompt
    pub async fn load(&self) -> Result<()> {
        if self.dashboard.load().await? == SessionStatus::Valid {
            self.terminal.mark_signed_in();
        }
        Ok(())
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn terminal(&self) -> &Terminal {
        &self.terminal
    }
}
