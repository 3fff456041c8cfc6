//! Error types for the tripspeed-ml crate.

use thiserror::Error;
use tripspeed_core::CoreError;

/// Top-level error type for model fitting and evaluation.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Dimension mismatch: expected {expected} columns, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Model not fitted: {0}")]
    NotFitted(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl MlError {
    pub fn empty_dataset(msg: impl Into<String>) -> Self {
        Self::EmptyDataset(msg.into())
    }

    pub fn not_fitted(msg: impl Into<String>) -> Self {
        Self::NotFitted(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// Result type alias for ML operations.
pub type Result<T, E = MlError> = std::result::Result<T, E>;
