//! # Lap Engine
//!
//! Lap-progress state machine of the sector timer.
//!
//! Responsibilities:
//! - `M:SS:mmm` time codec
//! - Forward-motion classification of noisy spline samples
//! - Sector ledger (checkpoints, cleared flags, last/best/delta)
//! - Pit-exit and session-reset detection
//! - Per-tick orchestration producing a [`TickReport`]
//!
//! ## Usage
//!
//! ```ignore
//! use lap_engine::{LapTimer, SectorLedger};
//!
//! let mut timer = LapTimer::new(SectorLedger::new(3));
//! timer.initialize(&host.environment(), &host.snapshot()?);
//!
//! // Once per simulation tick
//! let report = timer.tick(&host.snapshot()?);
//! for crossing in report.crossings() {
//!     // Render the split
//! }
//! ```

pub mod codec;
mod detector;
mod engine;
mod error;
mod ledger;
mod progress;

pub use codec::{format_delta, format_time, parse_seconds, parse_time, round_ms, ParsedTime, UNSET_TIME};
pub use detector::{DetectorStep, PitExit, StartAnchor, StartDetector};
pub use engine::{
    EnginePhase, LapTimer, TickReport, TimingEvent, UnsupportedEnvironment,
    FORCE_CLOSE_PROGRESS, LAP_COMMIT_PROGRESS_LIMIT, MIN_EXTENSION_VERSION,
};
pub use error::{LedgerError, Result};
pub use ledger::SectorLedger;
pub use progress::{Motion, ProgressClassifier};
