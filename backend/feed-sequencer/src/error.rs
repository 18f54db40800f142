/// Error types for feed-sequencer
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("No signed-in viewer")]
    Unauthenticated,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<envy::Error> for FeedError {
    fn from(err: envy::Error) -> Self {
        FeedError::Config(err.to_string())
    }
}

/// Result type alias for feed operations
pub type Result<T> = std::result::Result<T, FeedError>;
