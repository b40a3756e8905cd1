//! Feedback cues

use std::path::PathBuf;
use std::time::Duration;

use contracts::{Color, Widget};

/// Red/white cycles of an invalid-action flash
pub const FLASH_CYCLES: usize = 3;

/// Duration of each flash color
pub const FLASH_STEP: Duration = Duration::from_millis(200);

/// Short-lived UI or audio feedback run off the tick
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    /// Flash `widget` red/white, then leave it at `settle`
    Flash { widget: Widget, settle: Color },
    /// Play the new-best sound
    NewBestSound { asset: PathBuf },
    /// Advance the timing page after `delay`
    AdvancePage { delay: Duration },
}

impl Cue {
    /// Stable label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Cue::Flash { .. } => "flash",
            Cue::NewBestSound { .. } => "new_best_sound",
            Cue::AdvancePage { .. } => "advance_page",
        }
    }
}
