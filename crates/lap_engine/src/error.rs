//! Lap engine error types

use thiserror::Error;

/// Rejected ledger operations
///
/// Sector indices in messages are one-based to match the overlay captions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Index past the configured sector count
    #[error("sector {} does not exist (layout has {count} sectors)", .index + 1)]
    SectorOutOfRange { index: usize, count: usize },

    /// Layout has fewer sectors than allowed
    #[error("a layout needs at least {min} sectors, got {count}")]
    LayoutTooShort { count: usize, min: usize },

    /// Sector count outside the permitted range
    #[error("sector count {requested} outside {min}..={max}")]
    SectorCountOutOfRange {
        requested: usize,
        min: usize,
        max: usize,
    },

    /// Configuration contains an unset checkpoint
    #[error("checkpoint of sector {} is not set", .index + 1)]
    IncompleteLayout { index: usize },

    /// Spline position outside `[0, 1]`
    #[error("checkpoint of sector {} at {position} is outside the track", .index + 1)]
    PositionOutOfRange { index: usize, position: f64 },

    /// Checkpoint not strictly after its predecessor
    #[error(
        "checkpoint of sector {} at {position} must lie after sector {} at {previous}",
        .index + 1,
        .index
    )]
    OutOfOrder {
        index: usize,
        position: f64,
        previous: f64,
    },

    /// Finish-line sentinel used on a sector other than the last
    #[error("only the last sector may end on the finish line (sector {})", .index + 1)]
    MisplacedFinishLine { index: usize },

    /// Placement over an existing checkpoint
    #[error("checkpoint of sector {} is already set", .index + 1)]
    CheckpointAlreadySet { index: usize },

    /// Placement before the previous sector was placed
    #[error("sector {} must be placed before sector {}", .index, .index + 1)]
    PreviousCheckpointUnset { index: usize },
}

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
