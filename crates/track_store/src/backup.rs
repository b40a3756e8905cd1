//! Timestamped backups of the data file

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Local;
use contracts::ContractError;
use tracing::{debug, warn};

/// Backups kept after pruning
pub const DEFAULT_BACKUP_KEEP: usize = 10;

const BACKUP_PREFIX: &str = "data_";

/// Copy-then-prune rotation in a dedicated directory
#[derive(Debug, Clone)]
pub struct BackupRotation {
    dir: PathBuf,
    keep: usize,
}

impl BackupRotation {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            keep: DEFAULT_BACKUP_KEEP,
        }
    }

    pub fn with_keep(mut self, keep: usize) -> Self {
        self.keep = keep;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `source` into the backup directory, then prune the oldest copies
    ///
    /// Returns the path of the new backup.
    pub fn backup(&self, source: &Path) -> Result<PathBuf, ContractError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| ContractError::store_write(self.dir.display().to_string(), e.to_string()))?;

        let target = self.next_name();
        fs::copy(source, &target)
            .map_err(|e| ContractError::store_write(target.display().to_string(), e.to_string()))?;
        debug!(backup = %target.display(), "Data file backed up");

        self.prune()?;
        Ok(target)
    }

    /// Backups in the directory, oldest first
    pub fn list(&self) -> Result<Vec<PathBuf>, ContractError> {
        let entries = fs::read_dir(&self.dir)
            .map_err(|e| ContractError::store_read(self.dir.display().to_string(), e.to_string()))?;

        let mut backups: Vec<(SystemTime, PathBuf)> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| is_backup(path))
            .map(|path| (creation_time(&path), path))
            .collect();
        backups.sort();

        Ok(backups.into_iter().map(|(_, path)| path).collect())
    }

    fn prune(&self) -> Result<(), ContractError> {
        let backups = self.list()?;
        let excess = backups.len().saturating_sub(self.keep);
        for path in backups.into_iter().take(excess) {
            match fs::remove_file(&path) {
                Ok(()) => debug!(backup = %path.display(), "Old backup removed"),
                Err(e) => warn!(backup = %path.display(), error = %e, "Failed to remove old backup"),
            }
        }
        Ok(())
    }

    /// Millisecond timestamp; a numeric suffix separates backups within one millisecond
    fn next_name(&self) -> PathBuf {
        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S%.3f").to_string();
        let base = self.dir.join(format!("{BACKUP_PREFIX}{stamp}.json"));
        if !base.exists() {
            return base;
        }
        (1u32..)
            .map(|n| self.dir.join(format!("{BACKUP_PREFIX}{stamp}_{n:03}.json")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(base)
    }
}

fn is_backup(path: &Path) -> bool {
    path.is_file()
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(BACKUP_PREFIX) && name.ends_with(".json"))
}

/// Creation time where the platform reports it, modification time otherwise
fn creation_time(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|meta| meta.created().or_else(|_| meta.modified()))
        .unwrap_or(SystemTime::UNIX_EPOCH)
}
