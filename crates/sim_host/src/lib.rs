//! # Sim Host
//!
//! In-process stand-ins for the simulator collaborators.
//!
//! - [`ScriptedHost`]: replays a queue of telemetry frames, with failure injection
//! - [`FrameBuilder`]: terse construction of telemetry frames
//! - [`RecordingSurface`]: overlay that remembers every widget property
//! - [`RecordingPlayer`]: audio player that counts plays

mod frames;
mod host;
mod player;
mod surface;

pub use frames::FrameBuilder;
pub use host::{MockConfig, ScriptedHost};
pub use player::RecordingPlayer;
pub use surface::{RecordingSurface, WidgetState};
