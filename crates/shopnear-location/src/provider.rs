//! Position acquisition with a freshness cache.
//!
//! [`LocationProvider::initialize`] is the only place that touches the
//! geolocation source without an explicit user action: it tries the cache
//! first and acquires at most once. Every later acquisition goes through
//! [`LocationProvider::get_current_location`], which callers wire to a
//! user-facing "retry" or "refresh" control.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use shopnear_core::Position;

use crate::cache::{LocationCache, DEFAULT_LOCATION_TTL};
use crate::clock::{Clock, SystemClock};
use crate::error::{LocationError, StorageError};
use crate::geolocation::{GeolocationSource, PositionOptions};
use crate::storage::KeyValueStore;

/// Acquisition status as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationStatus {
    Idle,
    Loading,
    Available(Position),
    Error(LocationError),
}

impl LocationStatus {
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        match self {
            LocationStatus::Available(position) => Some(*position),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct ProviderState {
    status: LocationStatus,
    initialized: bool,
}

pub struct LocationProvider<G, S, C = SystemClock> {
    source: G,
    cache: LocationCache<S>,
    clock: C,
    options: PositionOptions,
    state: Mutex<ProviderState>,
}

impl<G, S> LocationProvider<G, S, SystemClock>
where
    G: GeolocationSource,
    S: KeyValueStore,
{
    pub fn new(source: G, store: S) -> Self {
        Self::with_clock(source, store, SystemClock)
    }
}

impl<G, S, C> LocationProvider<G, S, C>
where
    G: GeolocationSource,
    S: KeyValueStore,
    C: Clock,
{
    pub fn with_clock(source: G, store: S, clock: C) -> Self {
        Self {
            source,
            cache: LocationCache::new(store, DEFAULT_LOCATION_TTL),
            clock,
            options: PositionOptions::default(),
            state: Mutex::new(ProviderState {
                status: LocationStatus::Idle,
                initialized: false,
            }),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: PositionOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_ttl(self, ttl: Duration) -> Self {
        let Self {
            source,
            cache,
            clock,
            options,
            state,
        } = self;
        Self {
            source,
            cache: LocationCache::new(cache.into_store(), ttl),
            clock,
            options,
            state,
        }
    }

    #[must_use]
    pub fn status(&self) -> LocationStatus {
        self.lock().status.clone()
    }

    #[must_use]
    pub fn position(&self) -> Option<Position> {
        self.lock().status.position()
    }

    /// Returns the cached position if it is still fresh. Never mutates the
    /// cache.
    pub fn load_cached_location(&self) -> Option<Position> {
        self.cache.load(self.clock.now())
    }

    /// First-use policy: cached position if fresh, otherwise one automatic
    /// acquisition. Later calls return the current status without touching
    /// the source, so a denied permission is never re-prompted silently.
    pub async fn initialize(&self) -> LocationStatus {
        {
            let mut state = self.lock();
            if state.initialized {
                return state.status.clone();
            }
            state.initialized = true;
        }

        if let Some(position) = self.load_cached_location() {
            tracing::debug!(%position, "using cached location");
            self.set_status(LocationStatus::Available(position));
            return LocationStatus::Available(position);
        }

        match self.get_current_location().await {
            Ok(position) => LocationStatus::Available(position),
            Err(err) => LocationStatus::Error(err),
        }
    }

    /// Acquires a fresh position from the source, bounded by the configured
    /// timeout, and caches it on success.
    ///
    /// # Errors
    ///
    /// Returns the source's classified [`LocationError`], or
    /// [`LocationError::Timeout`] if the source does not answer in time.
    pub async fn get_current_location(&self) -> Result<Position, LocationError> {
        self.set_status(LocationStatus::Loading);

        let timeout = self.options.timeout;
        let result =
            match tokio::time::timeout(timeout, self.source.request_position(&self.options)).await
            {
                Ok(result) => result,
                Err(_) => Err(LocationError::Timeout {
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            };

        match result {
            Ok(position) => {
                if let Err(e) = self.cache.save(position, self.clock.now()) {
                    tracing::warn!(error = %e, "failed to persist acquired location");
                }
                tracing::info!(%position, "location acquired");
                self.set_status(LocationStatus::Available(position));
                Ok(position)
            }
            Err(err) => {
                tracing::warn!(error = %err, "location acquisition failed");
                self.set_status(LocationStatus::Error(err.clone()));
                Err(err)
            }
        }
    }

    /// Stores an externally supplied position as if it had just been
    /// acquired.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the cache write fails; the status is left
    /// unchanged in that case.
    pub fn override_location(&self, position: Position) -> Result<(), StorageError> {
        self.cache.save(position, self.clock.now())?;
        let mut state = self.lock();
        state.initialized = true;
        state.status = LocationStatus::Available(position);
        Ok(())
    }

    /// Drops the stored document. The in-memory status is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store write fails.
    pub fn clear_cached_location(&self) -> Result<(), StorageError> {
        self.cache.clear()
    }

    #[must_use]
    pub fn cache(&self) -> &LocationCache<S> {
        &self.cache
    }

    fn set_status(&self, status: LocationStatus) {
        self.lock().status = status;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProviderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "provider_test.rs"]
mod tests;
