use thiserror::Error;

/// Errors raised when building domain values from untrusted input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Latitude/longitude pair is missing, non-finite, or out of range.
    #[error("invalid coordinate (latitude={latitude:?}, longitude={longitude:?})")]
    InvalidCoordinate {
        latitude: Option<f64>,
        longitude: Option<f64>,
    },

    #[error("invalid search radius: {0} meters")]
    InvalidRadius(f64),

    #[error("unknown result kind: {0}")]
    UnknownResultKind(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
