//! Output interfaces: overlay widgets and audio cues.

use std::path::Path;

use crate::{ContractError, TimeSlot};

/// RGBA color with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Color = Color::rgb(0.0, 1.0, 0.0);
    /// Highlight of the sector currently being driven
    pub const ORANGE: Color = Color::rgb(1.0, 0.6, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Addressable element of the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Widget {
    /// "Sector N" caption in the timing window
    SectorLabel(usize),
    /// Time cell of a sector
    SectorTime(TimeSlot, usize),
    /// Checkpoint placement button in the settings window
    SectorButton(usize),
    TotalTime,
    TheoreticalBest,
    ResetTimesButton,
    ResetCheckpointsButton,
    FinishLineButton,
    SectorCountSpinner,
    PageSpinner,
    /// Line of the explanatory message shown when timing is disabled
    ErrorLine(usize),
}

/// Rendering target owned by the host UI toolkit
///
/// Calls are fire-and-forget; the toolkit has no failure channel.
pub trait OverlaySurface: Send + Sync {
    fn set_text(&self, widget: Widget, text: &str);

    fn set_color(&self, widget: Widget, color: Color);

    fn set_visible(&self, widget: Widget, visible: bool);

    /// Numeric value of spinners
    fn set_value(&self, widget: Widget, value: f64);
}

/// Audio output
#[trait_variant::make(CuePlayer: Send)]
pub trait LocalCuePlayer {
    /// Play a short sound asset to completion
    ///
    /// # Errors
    /// Returns an audio error when the asset cannot be played
    async fn play(&self, asset: &Path) -> Result<(), ContractError>;
}
