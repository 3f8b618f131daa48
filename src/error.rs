// Error types for the emergence client.
// Covers API transport and status errors, authentication, decoding, and cache I/O.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmergenceError {
    #[error("Artsy API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Missing ARTSY_CLIENT_ID or ARTSY_CLIENT_SECRET environment variable")]
    MissingCredentials,

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index {index} out of range for {len} shows")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

impl EmergenceError {
    /// Whether this error means the request could not be authenticated.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            EmergenceError::Unauthenticated(_) | EmergenceError::MissingCredentials
        )
    }
}

pub type Result<T> = std::result::Result<T, EmergenceError>;
