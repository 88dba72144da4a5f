//! Logging setup for geofence tools
//!
//! Provides:
//! - Structured logging with tracing
//! - A per-process session id for correlating log lines
//! - Operation timing

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize with custom configuration
///
/// `RUST_LOG` takes precedence over `config.log_level` when set.
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let result = if config.json {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer()
                .json()
                .with_target(config.show_target)
                .with_writer(std::io::stderr));
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer()
                .with_target(config.show_target)
                .with_writer(std::io::stderr)
                .compact());
        tracing::subscriber::set_global_default(subscriber)
    };

    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Logging initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub show_target: bool,
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            show_target: false,
            json: false,
        }
    }
}

impl TelemetryConfig {
    /// Configuration with the level raised to `debug`
    pub fn verbose(mut self) -> Self {
        self.log_level = "debug".to_string();
        self
    }
}

/// Timer for measuring operation duration
pub struct Timer {
    name: String,
    start: Instant,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
        }
    }

    /// Stop the timer and log the duration
    pub fn stop(self) -> Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.name,
            duration_ms = duration.as_secs_f64() * 1000.0,
            "Timer completed"
        );
        duration
    }
}

/// Run `f` inside an info span named `name`, logging how long it took
pub fn timed<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let timer = Timer::start(name);
    let span = tracing::info_span!("timed", operation = name);
    let value = span.in_scope(f);
    timer.stop();
    value
}
