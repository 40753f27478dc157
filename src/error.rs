//! Error types surfaced to the user

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for downloader operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message used when the backend reports a failure without saying why
pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Error)]
pub enum Error {
    /// Input could not be turned into a request (nothing was sent)
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-success status
    #[error("{message} (HTTP {status})")]
    Remote {
        /// HTTP status code returned by the backend
        status: u16,
        /// The `error` field of the JSON body, or a generic fallback
        message: String,
    },

    /// The request could not complete or the response was unreadable
    #[error("network error: {0}")]
    Network(String),

    /// The payload could not be written to the download folder
    #[error("could not save {}: {source}", .path.display())]
    Save {
        /// Destination that failed
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let msg = if err.is_connect() {
            format!("connection failed: {err}")
        } else if err.is_decode() {
            format!("malformed response: {err}")
        } else {
            err.to_string()
        };
        Error::Network(msg)
    }
}

impl Error {
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network(_))
    }
}
