//! # Track Store
//!
//! Persisted sector layouts and best times, one JSON document per install.
//!
//! - Rotating timestamped backups taken before every load
//! - Key order preserved across load/save
//! - Atomic save (temp file + rename); a file that failed to parse is never overwritten

mod backup;
mod document;
mod error;
mod store;

pub use backup::{BackupRotation, DEFAULT_BACKUP_KEEP};
pub use document::{
    SessionChanges, TrackDocument, TrackRecord, CHECKPOINTS_KEY, DATE_TIME_KEY, SECTOR_COUNT_KEY,
};
pub use error::{Result, StoreError};
pub use store::TrackStore;
