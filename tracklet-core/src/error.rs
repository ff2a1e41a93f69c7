//! Error types for tracklet-core

use thiserror::Error;

/// Main error type for the tracklet-core library
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (raised at construction or config load, never from `track`)
    #[error("configuration error: {0}")]
    Config(String),

    /// The request never got a response (DNS, connect, TLS, timeout)
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The endpoint answered with status >= 400
    #[error("delivery failed ({status}): {body}")]
    Delivery { status: u16, body: String },

    /// Event rejected before sending
    #[error("invalid event: {0}")]
    InvalidEvent(String),

    /// Blocking client used where it can't block
    #[error("runtime error: {0}")]
    Runtime(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// HTTP status of a delivery failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Delivery { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `error` field of a JSON delivery-failure body, if there is one.
    ///
    /// The ingestion endpoint answers failures with `{"error": "..."}`.
    pub fn server_message(&self) -> Option<String> {
        let Error::Delivery { body, .. } = self else {
            return None;
        };

        serde_json::from_str::<serde_json::Value>(body)
            .ok()?
            .get("error")?
            .as_str()
            .map(str::to_string)
    }
}

/// Result type alias for tracklet-core
pub type Result<T> = std::result::Result<T, Error>;
