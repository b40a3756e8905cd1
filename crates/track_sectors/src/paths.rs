//! Files the plugin reads and writes, relative to its install folder

use std::path::{Path, PathBuf};

/// Install-folder layout
#[derive(Debug, Clone)]
pub struct PluginPaths {
    root: PathBuf,
}

impl PluginPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// User settings
    pub fn config_file(&self) -> PathBuf {
        self.root.join("config").join("config.toml")
    }

    /// Shipped settings defaults
    pub fn defaults_file(&self) -> PathBuf {
        self.root.join("config").join("config_defaults.toml")
    }

    /// Stored layouts and best times
    pub fn data_file(&self) -> PathBuf {
        self.root.join("data").join("data.json")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.root.join("data").join("backups")
    }

    pub fn new_best_sound(&self) -> PathBuf {
        self.root.join("new_best.wav")
    }
}
