use shopnear_core::ResultKind;
use thiserror::Error;

/// Errors returned by the Nearby Search API client.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body is not valid JSON.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body parsed but is not a JSON array.
    #[error("expected a JSON array from {url}")]
    UnexpectedShape { url: String },

    #[error("invalid base URL '{base_url}': {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

/// Failures surfaced by the proximity query coordinator.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// The nearby query failed; the previous result set was kept.
    #[error("nearby {kind} query failed: {source}")]
    FetchFailed {
        kind: ResultKind,
        #[source]
        source: SearchError,
    },
}

impl CoordinatorError {
    /// Text for the non-blocking error banner.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CoordinatorError::FetchFailed { kind, .. } => {
                format!("Failed to fetch nearby {kind}. Please try again later.")
            }
        }
    }
}
