//! # Feedback
//!
//! Short-lived UI and audio cues run off the simulation tick.
//!
//! The tick hands cues to [`FeedbackHandle::try_send`], which never blocks: a
//! full queue drops the cue and counts it. The worker runs every cue in its own
//! task; cues touch only widget display properties and the shared [`Pager`].
//!
//! ```ignore
//! let pager = Arc::new(Pager::new(sector_count, UiLayout::Full));
//! let feedback = FeedbackHandle::spawn_on(runtime.handle(), surface, player, pager, 32);
//!
//! feedback.try_send(Cue::Flash { widget: Widget::ResetTimesButton, settle: Color::WHITE })?;
//! ```

mod cue;
mod error;
mod handle;
mod metrics;
mod pager;

pub use cue::{Cue, FLASH_CYCLES, FLASH_STEP};
pub use error::FeedbackError;
pub use handle::{FeedbackHandle, DEFAULT_QUEUE_CAPACITY};
pub use metrics::{FeedbackMetrics, FeedbackSnapshot};
pub use pager::{Pager, SECTORS_PER_PAGE};
