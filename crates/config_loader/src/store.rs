//! Dirty-flag settings store

use std::path::{Path, PathBuf};

use contracts::{AppSettings, ContractError};
use tracing::{debug, info, instrument};

use crate::{validator, ConfigLoader};

/// Settings owned by the running plugin
///
/// Mutations go through [`SettingsStore::update`]; the file is rewritten on
/// [`SettingsStore::save_if_dirty`] only after an accepted change.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: AppSettings,
    dirty: bool,
}

impl SettingsStore {
    /// Load settings from `path`, merged with `defaults`
    pub fn open(path: impl Into<PathBuf>, defaults: &str) -> Result<Self, ContractError> {
        let path = path.into();
        let settings = ConfigLoader::load_from_path(&path, defaults)?;
        Ok(Self {
            path,
            settings,
            dirty: false,
        })
    }

    /// Wrap already-loaded settings, e.g. defaults after a failed load
    pub fn with_settings(path: impl Into<PathBuf>, settings: AppSettings) -> Self {
        Self {
            path: path.into(),
            settings,
            dirty: false,
        }
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Apply a change; rejected changes leave the settings untouched
    ///
    /// # Errors
    /// Returns a validation error when the changed settings are out of range.
    pub fn update<F>(&mut self, change: F) -> Result<(), ContractError>
    where
        F: FnOnce(&mut AppSettings),
    {
        let mut candidate = self.settings.clone();
        change(&mut candidate);
        validator::validate(&candidate)?;

        if candidate != self.settings {
            self.settings = candidate;
            self.dirty = true;
        }
        Ok(())
    }

    /// Write the settings file if any change was accepted
    ///
    /// Returns whether a write happened.
    #[instrument(name = "settings_save", skip(self), fields(path = %self.path.display()))]
    pub fn save_if_dirty(&mut self) -> Result<bool, ContractError> {
        if !self.dirty {
            debug!("Settings unchanged, skipping write");
            return Ok(false);
        }

        let content = ConfigLoader::to_toml(&self.settings)?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, content)?;
        self.dirty = false;

        info!("Settings written");
        Ok(true)
    }
}
