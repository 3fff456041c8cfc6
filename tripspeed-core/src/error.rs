//! Error types for the tripspeed core library.
//!
//! Uses `thiserror` for public API error types. Feature computation itself is
//! permissive (non-finite values flow through to the range filter), so these
//! variants cover argument validation, schema lookups and I/O.

use std::path::PathBuf;

/// Top-level error type for the tripspeed core library.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown column '{column}'")]
    UnknownColumn { column: String },

    #[error("Duplicate trip id '{id}'")]
    DuplicateTripId { id: String },

    #[error("Unparseable timestamp '{value}'")]
    Timestamp { value: String },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),
}

impl CoreError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
