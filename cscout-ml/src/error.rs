//! Error types for the cscout-ml crate.

use thiserror::Error;

/// Top-level error type for classifier operations.
#[derive(Debug, Error)]
pub enum MlError {
    #[error("No trained model found at '{0}'")]
    ModelNotFound(String),

    #[error("Classifier has not been trained or loaded")]
    ModelNotTrained,

    #[error("Training corpus is empty")]
    EmptyCorpus,

    #[error("Incompatible model: {0}")]
    IncompatibleModel(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl MlError {
    pub fn incompatible(msg: impl Into<String>) -> Self {
        Self::IncompatibleModel(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
