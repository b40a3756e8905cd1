//! Feedback worker metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the handle and its worker
#[derive(Debug, Default)]
pub struct FeedbackMetrics {
    queued: AtomicU64,
    dropped: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
}

impl FeedbackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn inc_queued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    /// Cues refused because the queue was full or closed
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }

    pub fn inc_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FeedbackSnapshot {
        FeedbackSnapshot {
            queued: self.queued(),
            dropped: self.dropped(),
            completed: self.completed(),
            failed: self.failed(),
        }
    }
}

/// Point-in-time copy of [`FeedbackMetrics`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeedbackSnapshot {
    pub queued: u64,
    pub dropped: u64,
    pub completed: u64,
    pub failed: u64,
}
