//! Dashboard configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

/// Environment variable overriding [`Config::api_base_url`]
pub const API_URL_ENV: &str = "APTFINDER_API_URL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend API root, e.g. `http://localhost:8000/api`
    pub api_base_url: String,
    /// Path to the database file
    pub database_path: PathBuf,
    /// Login entry point used for redirects
    pub login_path: String,
    pub session_ttl_ms: u64,
    /// Scrape status polling period
    pub poll_interval_ms: u64,
    /// Stats/listings refresh period
    pub refresh_interval_ms: u64,
    pub request_timeout_ms: u64,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            database_path: data_dir.join("aptfinder.db"),
            login_path: aptfinder_session::DEFAULT_LOGIN_PATH.to_string(),
            session_ttl_ms: 86_400_000,
            poll_interval_ms: 2_000,
            refresh_interval_ms: 30_000,
            request_timeout_ms: 30_000,
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("aptfinder"))
            .unwrap_or_else(|| PathBuf::from(".aptfinder"))
    }

    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Read a JSON config file. Missing fields take their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;

        tracing::info!(path = %path.as_ref().display(), "Loaded configuration");

        Ok(config)
    }

    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::Config("api_base_url is empty".to_string()));
        }

        for (name, value) in [
            ("session_ttl_ms", self.session_ttl_ms),
            ("poll_interval_ms", self.poll_interval_ms),
            ("refresh_interval_ms", self.refresh_interval_ms),
            ("request_timeout_ms", self.request_timeout_ms),
        ] {
            if value == 0 {
                return Err(CoreError::Config(format!("{name} must be positive")));
            }
        }

        Ok(())
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_millis(self.session_ttl_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}
