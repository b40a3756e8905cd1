//! # Config Loader
//!
//! Settings loading and persistence module.
//!
//! Responsibilities:
//! - Parse the user's TOML settings file
//! - Fill missing sections/keys from the shipped defaults without touching user values
//! - Validate ranges
//! - Write settings back only when something changed
//!
//! # Example
//!
//! ```no_run
//! use config_loader::{ConfigLoader, BUNDLED_DEFAULTS};
//! use std::path::Path;
//!
//! let settings = ConfigLoader::load_from_path(Path::new("config/config.toml"), BUNDLED_DEFAULTS).unwrap();
//! println!("layout: {:?}", settings.main_app.layout());
//! ```

mod parser;
mod store;
mod validator;

pub use contracts::AppSettings;
pub use parser::merge_defaults;
pub use store::SettingsStore;

use contracts::ContractError;
use std::path::Path;
use tracing::debug;

/// Defaults compiled into the binary, used when no defaults file ships next to the config
pub const BUNDLED_DEFAULTS: &str = include_str!("../config_defaults.toml");

/// Settings loader
///
/// Provides static methods to load settings from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load settings from the user's file, merged with `defaults`
    ///
    /// A missing user file is treated as empty, so every value comes from defaults.
    ///
    /// # Errors
    /// - File read failure (other than not found)
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path, defaults: &str) -> Result<AppSettings, ContractError> {
        let content = Self::read_optional(path)?;
        Self::load_from_str(&content, defaults)
    }

    /// Load settings from strings
    ///
    /// # Errors
    /// - Parse failure of either document
    /// - Validation failure
    pub fn load_from_str(content: &str, defaults: &str) -> Result<AppSettings, ContractError> {
        let mut table = parser::parse_table(content)?;
        let default_table = parser::parse_table(defaults)?;

        let added = parser::merge_defaults(&mut table, &default_table);
        if added > 0 {
            debug!(added, "Filled missing settings from defaults");
        }

        let settings = parser::into_settings(table)?;
        validator::validate(&settings)?;
        Ok(settings)
    }

    /// Read the defaults file shipped next to the config, falling back to the bundled copy
    pub fn read_defaults(path: &Path) -> String {
        match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => BUNDLED_DEFAULTS.to_string(),
        }
    }

    /// Serialize settings to TOML string
    pub fn to_toml(settings: &AppSettings) -> Result<String, ContractError> {
        toml::to_string_pretty(settings)
            .map_err(|e| ContractError::config_parse(format!("TOML serialize error: {e}")))
    }
}

impl ConfigLoader {
    fn read_optional(path: &Path) -> Result<String, ContractError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }
}
