use thiserror::Error;

/// Common error type for netplot components.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid timestamp '{value}': {reason}")]
    Timestamp { value: String, reason: String },

    #[error("Invalid greeting from server: {0}")]
    Greeting(String),
}

impl Error {
    pub(crate) fn timestamp(value: &str, reason: impl Into<String>) -> Self {
        Error::Timestamp {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using netplot's Error.
pub type Result<T> = std::result::Result<T, Error>;
