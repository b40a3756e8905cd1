//! Track store error types

use std::path::PathBuf;

use thiserror::Error;

/// Store-specific errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Read or write failure (from contract)
    #[error("store error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// Document could not be encoded
    #[error("failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),

    /// Save attempted on a document that failed to parse at load
    #[error("'{}' was not readable at load and is left untouched", .path.display())]
    ReadOnly { path: PathBuf },
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
