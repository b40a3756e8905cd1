//! # Contracts
//!
//! Frozen interface contracts shared by every crate of the plugin.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Lap and sector times are seconds (`f64`) rounded to milliseconds
//! - The host reports lap times in integer milliseconds; conversion happens at the
//!   [`TelemetrySnapshot`] boundary
//! - Track progress is the normalized spline position in `[0, 1]`

mod error;
mod host;
mod settings;
mod surface;
mod telemetry;
mod timing;

pub use error::*;
pub use host::SimHost;
pub use settings::*;
pub use surface::*;
pub use telemetry::*;
pub use timing::*;
