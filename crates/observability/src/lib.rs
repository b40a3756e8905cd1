//! # Observability
//!
//! Tracing initialization and timing metrics.
//!
//! ## Features
//!
//! - Tracing setup (JSON / Pretty / Compact), filtered through `RUST_LOG`
//! - `metrics` facade counters for sector crossings, laps, resets and cues
//! - In-memory session statistics with a printable summary
//!
//! The plugin installs no metrics exporter; the host process may install any
//! `metrics` recorder before the plugin loads.
//!
//! ## Example
//!
//! ```ignore
//! use observability::{init, metrics};
//!
//! observability::init()?;
//!
//! for crossing in report.crossings() {
//!     metrics::record_sector_crossing(crossing);
//! }
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-exports
pub use crate::metrics::{
    record_cue, record_lap_committed, record_motion_rejected, record_sector_crossing,
    record_session_reset, RunningStats, SessionStatsAggregator, SessionSummary, StatsSummary,
};

/// Initialize tracing with defaults (JSON, `info`)
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// Observability configuration
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// Log format
    pub log_format: LogFormat,
    /// Level used when `RUST_LOG` is not set
    pub default_log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            default_log_level: "info".to_string(),
        }
    }
}

/// Log format
#[derive(Debug, Clone, Copy, Default)]
pub enum LogFormat {
    /// JSON structured logs
    #[default]
    Json,
    /// Human readable
    Pretty,
    /// Single line
    Compact,
}

/// Initialize with custom configuration
///
/// Fails if a global subscriber is already installed, which happens when the
/// host has set up its own logging.
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.default_log_level));

    match config.log_format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_names(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().compact())
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    tracing::info!(log_format = ?config.log_format, "Observability initialized");

    Ok(())
}
