//! Configuration module for the Chazu backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default refresh interval used by dashboards polling for alerts and orders.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to SQLite database file holding the storage slots
    pub db_path: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
    /// Interval between client-side refreshes
    pub poll_interval: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_path = env::var("CHAZU_DB_PATH")
            .unwrap_or_else(|_| "./data/chazu.sqlite".to_string())
            .into();

        let log_level = env::var("CHAZU_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("CHAZU_LOG_JSON")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        let poll_secs = env::var("CHAZU_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);

        Self {
            db_path,
            log_level,
            log_json,
            poll_interval: Duration::from_secs(poll_secs),
        }
    }
}
