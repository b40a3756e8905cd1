//! On-disk store: backup, load and atomic save of the data file

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use contracts::{ContractError, TrackKey};
use lap_engine::SectorLedger;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use crate::backup::BackupRotation;
use crate::document::{SessionChanges, TrackDocument, TrackRecord};
use crate::error::{Result, StoreError};

/// Format of the `date_time` stamp written on every load
const DATE_TIME_FORMAT: &str = "%d_%m_%Y_%H_%M_%S";

/// Data file and the document loaded from it
#[derive(Debug)]
pub struct TrackStore {
    path: PathBuf,
    document: TrackDocument,
    /// Set when the file on disk could not be parsed
    read_only: bool,
}

impl TrackStore {
    /// Back up and load the data file at `path`
    ///
    /// A missing file is created empty; an empty file loads as an empty
    /// document. A file that fails to parse is left untouched and the store
    /// runs read-only for the session. Backup failures are logged only.
    #[instrument(name = "track_store_open", skip_all, fields(path = %path.display()))]
    pub fn open(path: &Path, backups: &BackupRotation) -> Result<Self> {
        let stamp = Local::now().format(DATE_TIME_FORMAT).to_string();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
            }
            fs::File::create(path).map_err(|e| write_error(path, e))?;
            info!("Data file created");
            return Ok(Self::with_document(path, TrackDocument::new(), stamp));
        }

        if let Err(e) = backups.backup(path) {
            warn!(error = %e, "Data file backup failed");
        }

        let content = fs::read_to_string(path)
            .map_err(|e| ContractError::store_read(path.display().to_string(), e.to_string()))?;

        if content.trim().is_empty() {
            debug!("Data file empty");
            return Ok(Self::with_document(path, TrackDocument::new(), stamp));
        }

        match serde_json::from_str::<Map<String, Value>>(&content) {
            Ok(root) => {
                info!(tracks = root.len().saturating_sub(1), "Data file loaded");
                Ok(Self::with_document(path, TrackDocument::from_map(root), stamp))
            }
            Err(e) => {
                warn!(error = %e, "Data file unreadable, running without persistence");
                let mut store = Self::with_document(path, TrackDocument::new(), stamp);
                store.read_only = true;
                Ok(store)
            }
        }
    }

    /// Store that never touches the disk
    pub fn detached(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            document: TrackDocument::new(),
            read_only: true,
        }
    }

    fn with_document(path: &Path, mut document: TrackDocument, stamp: String) -> Self {
        document.set_date_time(stamp);
        Self {
            path: path.to_path_buf(),
            document,
            read_only: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn document(&self) -> &TrackDocument {
        &self.document
    }

    pub fn record(&self, key: &TrackKey) -> Option<TrackRecord> {
        self.document.record(key)
    }

    pub fn apply(&mut self, key: &TrackKey, ledger: &SectorLedger, changes: SessionChanges) {
        self.document.apply(key, ledger, changes);
    }

    /// Atomically replace the data file with the in-memory document
    #[instrument(name = "track_store_save", skip(self), fields(path = %self.path.display()))]
    pub fn save(&self) -> Result<()> {
        if self.read_only {
            return Err(StoreError::ReadOnly {
                path: self.path.clone(),
            });
        }

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut temp = NamedTempFile::new_in(&dir).map_err(|e| write_error(&dir, e))?;
        {
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut serializer = Serializer::with_formatter(temp.as_file_mut(), formatter);
            serde::Serialize::serialize(self.document.as_map(), &mut serializer)?;
        }
        temp.as_file_mut()
            .flush()
            .map_err(|e| write_error(&self.path, e))?;
        temp.persist(&self.path)
            .map_err(|e| write_error(&self.path, e.error))?;

        info!("Data file saved");
        Ok(())
    }
}

fn write_error(path: &Path, e: std::io::Error) -> ContractError {
    ContractError::store_write(path.display().to_string(), e.to_string())
}
