//! Freshness-bounded persistence of the last acquired position.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopnear_core::Position;

use crate::error::StorageError;
use crate::storage::KeyValueStore;

/// Fixed storage key for the cached location document.
pub const LOCATION_STORAGE_KEY: &str = "userLocation";

/// How long an acquired position may be reused without re-prompting.
pub const DEFAULT_LOCATION_TTL: Duration = Duration::from_secs(30 * 60);

/// The persisted document: `{"position": {...}, "capturedAt": ..., "ttlSecs": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedLocation {
    pub position: Position,
    pub captured_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl CachedLocation {
    #[must_use]
    pub fn new(position: Position, captured_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            position,
            captured_at,
            ttl_secs: ttl.as_secs(),
        }
    }

    /// Valid while `now - captured_at < ttl`.
    #[must_use]
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        now.signed_duration_since(self.captured_at) < ttl
    }
}

/// Reads and writes [`CachedLocation`] under [`LOCATION_STORAGE_KEY`].
///
/// Expiry is evaluated lazily at read time and never deletes the stored
/// document.
#[derive(Debug)]
pub struct LocationCache<S> {
    store: S,
    ttl: Duration,
}

impl<S: KeyValueStore> LocationCache<S> {
    pub fn new(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Returns the raw stored document, fresh or not.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the store fails or the document is corrupt.
    pub fn read(&self) -> Result<Option<CachedLocation>, StorageError> {
        let Some(raw) = self.store.get(LOCATION_STORAGE_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Json {
                context: LOCATION_STORAGE_KEY.to_string(),
                source,
            })
    }

    /// Returns the cached position if it is still fresh at `now`.
    ///
    /// The stricter of the stored TTL and this cache's TTL applies. Storage
    /// or decode failures are logged and read as a miss.
    pub fn load(&self, now: DateTime<Utc>) -> Option<Position> {
        let cached = match self.read() {
            Ok(Some(cached)) => cached,
            Ok(None) => {
                tracing::debug!("no cached location");
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable cached location");
                return None;
            }
        };

        let ttl = self.ttl.min(Duration::from_secs(cached.ttl_secs));
        if cached.is_fresh_at(now, ttl) {
            Some(cached.position)
        } else {
            tracing::debug!(captured_at = %cached.captured_at, "cached location expired");
            None
        }
    }

    /// Overwrites the stored document in one write.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if serialization or the store write fails.
    pub fn save(&self, position: Position, now: DateTime<Utc>) -> Result<(), StorageError> {
        let doc = CachedLocation::new(position, now, self.ttl);
        let body = serde_json::to_string(&doc).map_err(|source| StorageError::Json {
            context: LOCATION_STORAGE_KEY.to_string(),
            source,
        })?;
        self.store.set(LOCATION_STORAGE_KEY, &body)
    }

    /// # Errors
    ///
    /// Returns [`StorageError`] if the store write fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.clear(LOCATION_STORAGE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::storage::MemoryStore;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn mumbai() -> Position {
        Position::new(19.076, 72.8777).unwrap()
    }

    #[test]
    fn round_trip_within_ttl_returns_same_position() {
        let cache = LocationCache::new(MemoryStore::new(), DEFAULT_LOCATION_TTL);
        cache.save(mumbai(), t0()).unwrap();

        let later = t0() + chrono::Duration::minutes(29);
        assert_eq!(cache.load(later), Some(mumbai()));
    }

    #[test]
    fn expires_exactly_at_ttl_without_mutating_store() {
        let cache = LocationCache::new(MemoryStore::new(), DEFAULT_LOCATION_TTL);
        cache.save(mumbai(), t0()).unwrap();

        let at_ttl = t0() + chrono::Duration::minutes(30);
        assert_eq!(cache.load(at_ttl), None);
        assert_eq!(cache.load(at_ttl + chrono::Duration::days(3)), None);

        let stored = cache.read().unwrap().expect("document must still be stored");
        assert_eq!(stored.position, mumbai());
        assert_eq!(stored.captured_at, t0());
    }

    #[test]
    fn stored_document_uses_camel_case_fields() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let cache = LocationCache::new(std::sync::Arc::clone(&store), DEFAULT_LOCATION_TTL);
        cache.save(mumbai(), t0()).unwrap();

        let raw = store.get(LOCATION_STORAGE_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["position"]["latitude"], 19.076);
        assert!(value.get("capturedAt").is_some());
        assert_eq!(value["ttlSecs"], 1800);
    }

    #[test]
    fn shorter_configured_ttl_wins_over_stored_ttl() {
        let store = std::sync::Arc::new(MemoryStore::new());
        LocationCache::new(std::sync::Arc::clone(&store), DEFAULT_LOCATION_TTL)
            .save(mumbai(), t0())
            .unwrap();

        let strict = LocationCache::new(store, Duration::from_secs(60));
        assert_eq!(strict.load(t0() + chrono::Duration::seconds(59)), Some(mumbai()));
        assert_eq!(strict.load(t0() + chrono::Duration::seconds(61)), None);
    }

    #[test]
    fn corrupt_document_reads_as_miss() {
        let store = MemoryStore::new();
        store.set(LOCATION_STORAGE_KEY, "{\"position\": 12}").unwrap();
        let cache = LocationCache::new(store, DEFAULT_LOCATION_TTL);
        assert_eq!(cache.load(t0()), None);
    }

    #[test]
    fn out_of_range_stored_position_reads_as_miss() {
        let store = MemoryStore::new();
        store
            .set(
                LOCATION_STORAGE_KEY,
                r#"{"position":{"latitude":200.0,"longitude":0.0},"capturedAt":"2025-03-01T12:00:00Z","ttlSecs":1800}"#,
            )
            .unwrap();
        let cache = LocationCache::new(store, DEFAULT_LOCATION_TTL);
        assert_eq!(cache.load(t0()), None);
    }
}
