//! Sector timing data contracts.

use serde::{Deserialize, Serialize};

/// Raw value stored for a checkpoint that has not been placed yet
pub const UNSET_CHECKPOINT: f64 = -1.0;

/// Raw value stored for a checkpoint that coincides with the finish line
pub const FINISH_LINE_CHECKPOINT: f64 = 2.0;

/// Sector boundary on the track
///
/// Persisted as a bare number so existing data files stay readable:
/// `-1` for [`Checkpoint::Unset`], `2` for [`Checkpoint::FinishLine`],
/// otherwise the spline position in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Checkpoint {
    /// Not configured yet
    #[default]
    Unset,
    /// Spline position in `[0, 1]`
    At(f64),
    /// Closed only by the lap-completion path
    FinishLine,
}

impl Checkpoint {
    /// Raw numeric form used for crossing comparisons and persistence
    pub fn as_raw(self) -> f64 {
        match self {
            Checkpoint::Unset => UNSET_CHECKPOINT,
            Checkpoint::At(position) => position,
            Checkpoint::FinishLine => FINISH_LINE_CHECKPOINT,
        }
    }

    /// Parse a raw stored value
    ///
    /// Returns `None` for values that are neither a sentinel nor a spline position.
    pub fn from_raw(raw: f64) -> Option<Self> {
        if raw == UNSET_CHECKPOINT {
            Some(Checkpoint::Unset)
        } else if raw == FINISH_LINE_CHECKPOINT {
            Some(Checkpoint::FinishLine)
        } else if (0.0..=1.0).contains(&raw) {
            Some(Checkpoint::At(raw))
        } else {
            None
        }
    }

    pub fn is_set(self) -> bool {
        !matches!(self, Checkpoint::Unset)
    }

    /// Spline position, if this checkpoint is placed on track
    pub fn position(self) -> Option<f64> {
        match self {
            Checkpoint::At(position) => Some(position),
            _ => None,
        }
    }
}

impl TryFrom<f64> for Checkpoint {
    type Error = String;

    fn try_from(raw: f64) -> Result<Self, Self::Error> {
        Checkpoint::from_raw(raw).ok_or_else(|| format!("invalid checkpoint value {raw}"))
    }
}

impl From<Checkpoint> for f64 {
    fn from(checkpoint: Checkpoint) -> Self {
        checkpoint.as_raw()
    }
}

/// Time row of a sector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    /// Most recent split
    Last,
    /// Personal best split
    Best,
    /// Difference between the last split and the best it was compared against
    Delta,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 3] = [TimeSlot::Last, TimeSlot::Best, TimeSlot::Delta];

    /// Row index into per-slot tables
    pub const fn index(self) -> usize {
        match self {
            TimeSlot::Last => 0,
            TimeSlot::Best => 1,
            TimeSlot::Delta => 2,
        }
    }
}

/// Result of comparing a fresh split with the stored best
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CrossingOutcome {
    /// No best existed; the split became the best
    FirstTime,
    /// Strictly faster than the previous best
    NewBest { previous: f64 },
    /// Equal to or slower than the best
    Regression { best: f64 },
}

impl CrossingOutcome {
    /// Stable label for logs and metrics
    pub fn as_str(&self) -> &'static str {
        match self {
            CrossingOutcome::FirstTime => "first_time",
            CrossingOutcome::NewBest { .. } => "new_best",
            CrossingOutcome::Regression { .. } => "regression",
        }
    }

    pub fn is_new_best(&self) -> bool {
        matches!(self, CrossingOutcome::NewBest { .. })
    }
}

/// A sector closed during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorCrossing {
    /// Zero-based sector index
    pub index: usize,
    /// Split time in seconds
    pub split: f64,
    /// Comparison against the best
    pub outcome: CrossingOutcome,
    /// `split - previous best`, negative when faster; `None` on a first time
    pub delta: Option<f64>,
}

/// Why the session progress was reinitialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetCause {
    /// Car entered the pit area after leaving it
    Pitted,
    /// Session clock moved against its expected direction
    ClockJump,
}

impl ResetCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResetCause::Pitted => "pitted",
            ResetCause::ClockJump => "clock_jump",
        }
    }
}
