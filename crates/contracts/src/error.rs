//! Layered error definitions
//!
//! Categorized by source: settings / host / store / audio

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Settings Errors =====
    /// Settings parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Settings validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Host Errors =====
    /// Host telemetry could not be read
    #[error("host unavailable: {message}")]
    HostUnavailable { message: String },

    // ===== Store Errors =====
    /// Persisted document could not be read
    #[error("store read error for '{path}': {message}")]
    StoreRead { path: String, message: String },

    /// Persisted document could not be written
    #[error("store write error for '{path}': {message}")]
    StoreWrite { path: String, message: String },

    // ===== Audio Errors =====
    /// Sound asset playback failed
    #[error("audio playback error for '{asset}': {message}")]
    Audio { asset: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create host unavailable error
    pub fn host_unavailable(message: impl Into<String>) -> Self {
        Self::HostUnavailable {
            message: message.into(),
        }
    }

    /// Create store read error
    pub fn store_read(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreRead {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create store write error
    pub fn store_write(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StoreWrite {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create audio playback error
    pub fn audio(asset: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Audio {
            asset: asset.into(),
            message: message.into(),
        }
    }
}
