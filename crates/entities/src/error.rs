use thiserror::Error;

/// Result type for entity extraction
pub type Result<T> = std::result::Result<T, EntityError>;

/// Errors raised inside the extraction pipeline.
///
/// The public extraction entry points absorb these and degrade to empty
/// results; they surface only through the `try_*` variants.
#[derive(Error, Debug)]
pub enum EntityError {
    /// Classifier model is not loaded (or failed to load)
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Classifier ran but produced an error
    #[error("Classification failed: {0}")]
    Classification(String),

    /// Dictionary could not be read or parsed
    #[error("Dictionary '{name}' failed to load: {reason}")]
    Dictionary { name: String, reason: String },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl EntityError {
    pub fn model_unavailable(msg: impl Into<String>) -> Self {
        Self::ModelUnavailable(msg.into())
    }

    pub fn classification(msg: impl Into<String>) -> Self {
        Self::Classification(msg.into())
    }

    pub fn dictionary(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Dictionary {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
