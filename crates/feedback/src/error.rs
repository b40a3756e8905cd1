//! Feedback error types

use thiserror::Error;

/// Cue hand-off errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedbackError {
    /// Queue full - cue dropped
    #[error("feedback queue full, {kind} cue dropped")]
    QueueFull { kind: &'static str },

    /// Worker no longer running
    #[error("feedback worker closed, {kind} cue dropped")]
    WorkerClosed { kind: &'static str },
}
