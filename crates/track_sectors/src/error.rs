//! Error types for plugin operations.

use contracts::ContractError;
use lap_engine::{LedgerError, UnsupportedEnvironment};
use thiserror::Error;
use track_store::StoreError;

/// Plugin-level error types
#[derive(Error, Debug)]
pub enum PluginError {
    /// Settings, host or audio contract failure
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Data file failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Ledger rejected a layout edit
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// User action refused in the current car state
    #[error("{action} rejected: {reason}")]
    ActionRejected {
        action: &'static str,
        reason: String,
    },

    /// Timing is disabled for this session
    #[error("timing disabled: {0}")]
    Disabled(UnsupportedEnvironment),

    /// The car has not connected yet
    #[error("plugin not initialized")]
    NotInitialized,

    /// Cue runtime could not be started
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    pub fn action_rejected(action: &'static str, reason: impl Into<String>) -> Self {
        Self::ActionRejected {
            action,
            reason: reason.into(),
        }
    }
}

/// Result type alias for plugin operations
pub type Result<T> = std::result::Result<T, PluginError>;
