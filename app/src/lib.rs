//! Aptfinder - Terminal Application
//!
//! Renders the listings dashboard to stdout and reads commands from stdin.
//! All state lives in `aptfinder-core`; this crate only draws and forwards.

mod command;
mod info;
mod state;
mod terminal;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use aptfinder_core::{
    Config, CoreError, JobError, ListingFilters, RouteResolution, TriggerOutcome,
};
use command::{Command, HELP};
use info::{ApartmentInfo, StatusInfo};
use state::AppState;

/// Run the interactive dashboard.
///
/// The first command-line argument, if present, is a JSON config file.
pub async fn run() -> anyhow::Result<()> {
    // Initialize logging
    aptfinder_core::init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {path}"))?
            .with_overrides(|key| std::env::var(key).ok()),
        None => Config::from_env(),
    };

    let state = AppState::new(config).context("Failed to start dashboard")?;

    tracing::info!("Aptfinder started");

    if let Err(e) = state.load().await {
        report(&state, e);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        state.terminal().prompt();
        let Some(line) = lines.next_line().await? else {
            break;
        };

        match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => {
                if let Err(e) = execute(&state, command).await {
                    report(&state, e);
                }
            }
            Err(message) => state.terminal().print(&message),
        }
    }

    state.dashboard().shutdown();
    tracing::info!("Aptfinder stopped");

    Ok(())
}

async fn execute(state: &AppState, command: Command) -> aptfinder_core::Result<()> {
    let dashboard = state.dashboard();
    let terminal = state.terminal();

    match command {
        Command::Scrape => match dashboard.scrape().await {
            Ok(TriggerOutcome::Started(job_id)) => {
                terminal.print(&format!("Scrape started ({job_id})"));
            }
            Ok(TriggerOutcome::AlreadyRunning) => {}
            Err(CoreError::Job(JobError::AlreadyInFlight)) => {
                terminal.print("A scrape is already starting or running");
            }
            // Already shown as a notice or a redirect
            Err(e) => tracing::debug!("Scrape not started: {}", e),
        },
        Command::Filter(update) => {
            let filters = update.apply(dashboard.filters());
            dashboard.apply_filters(filters).await?;
        }
        Command::Clear => dashboard.apply_filters(ListingFilters::default()).await?,
        Command::Refresh => dashboard.refresh().await?,
        Command::Show(id) => {
            let apartment = dashboard.apartment(id).await?;
            let json = serde_json::to_string_pretty(&ApartmentInfo::from(apartment))?;
            terminal.print(&json);
        }
        Command::Login(token) => {
            dashboard.login(&token)?;
            state.load().await?;
        }
        Command::Logout => dashboard.logout()?,
        Command::Route(path) => {
            let line = match dashboard.route(&path) {
                RouteResolution::Login(to) => format!("'{path}' -> {to} (login)"),
                RouteResolution::Page(to) => format!("'{path}' -> {to}"),
                RouteResolution::Unchanged(to) => format!("'{path}' -> {to} (unchanged)"),
            };
            terminal.print(&line);
        }
        Command::Status => {
            let json = serde_json::to_string_pretty(&StatusInfo::collect(dashboard))?;
            terminal.print(&json);
        }
        Command::Help => terminal.print(HELP),
        Command::Quit => {}
    }

    Ok(())
}

fn report(state: &AppState, error: CoreError) {
    // Expired sessions were already reported by the redirect
    if error.is_auth_expired() {
        tracing::debug!("Action aborted: {}", error);
        return;
    }
    tracing::warn!("Command failed: {}", error);
    state.terminal().print(&format!("! {error}"));
}
