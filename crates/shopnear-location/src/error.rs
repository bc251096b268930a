use std::path::PathBuf;

use thiserror::Error;

/// Classified failure from a position acquisition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Geolocation is not supported by your browser")]
    Unsupported,
}

impl LocationError {
    /// Text shown in the dismissible location banner. A host without
    /// geolocation gets the bare notice.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Unsupported => self.to_string(),
            _ => format!("Error getting location: {self}"),
        }
    }
}

/// Errors from the durable key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error for {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
