//! # Track Sectors
//!
//! Sector timing overlay for a racing simulator.
//!
//! The host drives the plugin through four entry points:
//! - [`TrackSectors::new`] when the plugin is loaded
//! - [`TrackSectors::initialize`] once the player's car is connected
//!   (also done lazily by `update`)
//! - [`TrackSectors::update`] on every simulation tick
//! - [`TrackSectors::shutdown`] when the simulator exits
//!
//! User actions from the settings window (checkpoint placement, resets,
//! sector count, layout and preferences) are methods on the same object.
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use track_sectors::{PluginPaths, TrackSectors};
//!
//! let mut plugin = TrackSectors::new(
//!     PluginPaths::new("plugins/track_sectors"),
//!     Arc::new(host),
//!     Arc::new(overlay),
//!     Arc::new(player),
//! )?;
//!
//! // Every tick
//! plugin.update(delta_time);
//!
//! // On exit
//! let report = plugin.shutdown();
//! ```

mod actions;
mod app;
mod error;
pub mod messages;
mod paths;
pub mod render;
#[cfg(test)]
mod test_support;

pub use app::{ShutdownReport, TrackSectors, SHUTDOWN_DRAIN_TIMEOUT};
pub use error::{PluginError, Result};
pub use paths::PluginPaths;
