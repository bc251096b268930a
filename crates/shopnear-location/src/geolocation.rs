//! The device position source.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use shopnear_core::Position;

use crate::error::LocationError;

/// Acquisition options passed through to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Upper bound on the whole acquisition.
    pub timeout: Duration,
    /// Oldest fix the source may hand back from its own cache.
    pub max_cached_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_millis(15_000),
            max_cached_age: Duration::from_millis(10_000),
        }
    }
}

/// Single-shot position acquisition.
///
/// Implementations classify failures into [`LocationError`] variants; they
/// may prompt the user for permission.
pub trait GeolocationSource: Send + Sync {
    fn request_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Position, LocationError>> + Send;
}

impl<G: GeolocationSource> GeolocationSource for Arc<G> {
    fn request_position(
        &self,
        options: &PositionOptions,
    ) -> impl Future<Output = Result<Position, LocationError>> + Send {
        (**self).request_position(options)
    }
}

/// Always reports the same position. Used for overrides and hosts that know
/// where they are.
#[derive(Debug, Clone, Copy)]
pub struct FixedSource {
    position: Position,
}

impl FixedSource {
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

impl GeolocationSource for FixedSource {
    async fn request_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        Ok(self.position)
    }
}

/// A host without any geolocation capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedSource;

impl GeolocationSource for UnsupportedSource {
    async fn request_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        Err(LocationError::Unsupported)
    }
}
