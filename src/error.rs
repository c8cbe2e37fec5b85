// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CollectError>;

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Record carries a field the output store's header does not have.
    #[error("field `{field}` is not part of the output schema")]
    SchemaMismatch { field: String },

    #[error("output store not initialized: {}", .0.display())]
    NotInitialized(PathBuf),

    #[error("column `{0}` not found in input header")]
    MissingColumn(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CollectError {
    pub fn config(msg: impl Into<String>) -> Self {
        CollectError::Config(msg.into())
    }
}
