use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use super::*;
use crate::cache::LOCATION_STORAGE_KEY;
use crate::clock::ManualClock;
use crate::storage::MemoryStore;

/// Hands out queued results and counts how often it was asked.
#[derive(Default)]
struct ScriptedSource {
    results: Mutex<VecDeque<Result<Position, LocationError>>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    fn with(results: Vec<Result<Position, LocationError>>) -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(results.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeolocationSource for ScriptedSource {
    async fn request_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LocationError::PositionUnavailable("exhausted".to_string())))
    }
}

/// Never answers.
struct SilentSource;

impl GeolocationSource for SilentSource {
    async fn request_position(&self, _options: &PositionOptions) -> Result<Position, LocationError> {
        std::future::pending().await
    }
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn mumbai() -> Position {
    Position::new(19.076, 72.8777).unwrap()
}

fn pune() -> Position {
    Position::new(18.5204, 73.8567).unwrap()
}

fn denied() -> LocationError {
    LocationError::PermissionDenied("User denied Geolocation".to_string())
}

#[tokio::test]
async fn initialize_prefers_fresh_cache_over_source() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(t0()));
    LocationCache::new(Arc::clone(&store), DEFAULT_LOCATION_TTL)
        .save(mumbai(), t0())
        .unwrap();
    clock.advance(chrono::Duration::minutes(10));

    let source = ScriptedSource::with(vec![Ok(pune())]);
    let provider = LocationProvider::with_clock(Arc::clone(&source), store, clock);

    assert_eq!(
        provider.initialize().await,
        LocationStatus::Available(mumbai())
    );
    assert_eq!(source.calls(), 0, "fresh cache must not hit the source");
}

#[tokio::test]
async fn initialize_acquires_and_caches_when_cache_is_empty() {
    let store = Arc::new(MemoryStore::new());
    let source = ScriptedSource::with(vec![Ok(pune())]);
    let provider = LocationProvider::with_clock(
        Arc::clone(&source),
        Arc::clone(&store),
        ManualClock::new(t0()),
    );

    assert_eq!(provider.status(), LocationStatus::Idle);
    assert_eq!(provider.initialize().await, LocationStatus::Available(pune()));
    assert_eq!(source.calls(), 1);
    assert_eq!(provider.load_cached_location(), Some(pune()));
    assert!(store.get(LOCATION_STORAGE_KEY).unwrap().is_some());
}

#[tokio::test]
async fn initialize_reacquires_after_ttl_elapsed() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(t0()));
    LocationCache::new(Arc::clone(&store), DEFAULT_LOCATION_TTL)
        .save(mumbai(), t0())
        .unwrap();
    clock.advance(chrono::Duration::minutes(31));

    let source = ScriptedSource::with(vec![Ok(pune())]);
    let provider = LocationProvider::with_clock(Arc::clone(&source), store, Arc::clone(&clock));

    assert_eq!(provider.initialize().await, LocationStatus::Available(pune()));
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn initialize_runs_automatic_acquisition_only_once() {
    let source = ScriptedSource::with(vec![Err(denied()), Ok(pune())]);
    let provider = LocationProvider::with_clock(
        Arc::clone(&source),
        MemoryStore::new(),
        ManualClock::new(t0()),
    );

    assert_eq!(provider.initialize().await, LocationStatus::Error(denied()));
    assert_eq!(provider.initialize().await, LocationStatus::Error(denied()));
    assert_eq!(source.calls(), 1, "denial must not be retried silently");

    let retried = provider.get_current_location().await;
    assert_eq!(retried, Ok(pune()));
    assert_eq!(provider.status(), LocationStatus::Available(pune()));
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn failed_acquisition_keeps_previous_cache() {
    let store = Arc::new(MemoryStore::new());
    let source = ScriptedSource::with(vec![Ok(mumbai()), Err(denied())]);
    let provider = LocationProvider::with_clock(
        Arc::clone(&source),
        Arc::clone(&store),
        ManualClock::new(t0()),
    );

    provider.get_current_location().await.unwrap();
    let err = provider.get_current_location().await.unwrap_err();
    assert_eq!(err, denied());
    assert_eq!(provider.load_cached_location(), Some(mumbai()));
    assert_eq!(
        err.user_message(),
        "Error getting location: permission denied: User denied Geolocation"
    );
}

#[tokio::test(start_paused = true)]
async fn silent_source_times_out() {
    let options = PositionOptions {
        timeout: Duration::from_secs(15),
        ..PositionOptions::default()
    };
    let provider = LocationProvider::with_clock(SilentSource, MemoryStore::new(), ManualClock::new(t0()))
        .with_options(options);

    let err = provider.get_current_location().await.unwrap_err();
    assert_eq!(err, LocationError::Timeout { timeout_ms: 15_000 });
    assert_eq!(provider.status(), LocationStatus::Error(err));
}

#[tokio::test]
async fn unsupported_source_reports_unsupported() {
    let provider = LocationProvider::with_clock(
        crate::geolocation::UnsupportedSource,
        MemoryStore::new(),
        ManualClock::new(t0()),
    );
    let status = provider.initialize().await;
    assert_eq!(status, LocationStatus::Error(LocationError::Unsupported));
}

#[tokio::test]
async fn override_and_clear_manage_the_stored_document() {
    let source = ScriptedSource::with(vec![]);
    let provider = LocationProvider::with_clock(
        Arc::clone(&source),
        MemoryStore::new(),
        ManualClock::new(t0()),
    )
    .with_ttl(Duration::from_secs(60));

    provider.override_location(pune()).unwrap();
    assert_eq!(provider.position(), Some(pune()));
    assert_eq!(provider.load_cached_location(), Some(pune()));
    assert_eq!(provider.initialize().await, LocationStatus::Available(pune()));
    assert_eq!(source.calls(), 0);

    provider.clear_cached_location().unwrap();
    assert_eq!(provider.load_cached_location(), None);
    assert_eq!(provider.cache().ttl(), Duration::from_secs(60));
}
