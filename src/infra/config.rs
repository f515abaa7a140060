//! Centralized configuration (environment variables + defaults).

use crate::domain::session::manager::{DEFAULT_RETENTION, DEFAULT_SWEEP_INTERVAL};
use std::time::Duration;

fn env_u64(key: &str) -> Option<u64> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<u64>().ok())
}

/// Address the HTTP server binds to.
pub fn bind_addr() -> String {
    std::env::var("VALIDATOR_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string())
}

/// Idle time after which a batch session is expired (default: 30 minutes).
pub fn session_retention() -> Duration {
    env_u64("SESSION_RETENTION_SECS")
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_RETENTION)
}

/// Period of the session expiry sweep (default: 5 minutes, at least 1 second).
pub fn session_sweep_interval() -> Duration {
    env_u64("SESSION_SWEEP_INTERVAL_SECS")
        .map(|s| Duration::from_secs(s.max(1)))
        .unwrap_or(DEFAULT_SWEEP_INTERVAL)
}

/// Default `tracing` filter when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,record_validation_engine=info"
}
