//! The nearby page controller.
//!
//! Drives location acquisition and nearby queries through one state machine
//! and keeps the map and list views in step with it:
//!
//! ```text
//! NoLocation -> AcquiringLocation -> LocationAvailable { Querying -> ResultsAvailable | QueryError }
//!                                 -> LocationError (left only by an explicit retry)
//! ```

use std::sync::Arc;

use shopnear_core::{format_radius_km, Coordinates, Position, Radius, ResultKind};
use shopnear_location::{
    GeolocationSource, KeyValueStore, LocationError, LocationProvider, LocationStatus,
};
use shopnear_map::{MapRenderer, MarkerCandidate, SurfaceFactory};
use shopnear_search::{NearbySearch, ProximityQueryCoordinator, QueryStatus, SearchOutcome};

pub const MIN_RADIUS_KM: f64 = 1.0;
pub const MAX_RADIUS_KM: f64 = 50.0;
pub const DEFAULT_RADIUS_KM: f64 = 10.0;
pub const NEARBY_ZOOM: u8 = 12;
pub const MAP_CONTAINER: &str = "nearby-map";
pub const EMPTY_HINT: &str = "Try increasing your search radius.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Querying,
    ResultsAvailable,
    QueryError,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiscoveryPhase {
    NoLocation,
    AcquiringLocation,
    LocationAvailable {
        position: Position,
        query: QueryPhase,
    },
    LocationError(LocationError),
}

/// One row of the results list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: String,
    pub name: String,
    pub address: String,
    pub distance: String,
}

/// Clamps a slider value into the supported range. Non-finite input falls
/// back to the default.
#[must_use]
pub fn clamp_radius_km(km: f64) -> f64 {
    if km.is_finite() {
        km.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM)
    } else {
        DEFAULT_RADIUS_KM
    }
}

pub struct NearbyPage<G, S, A, F: SurfaceFactory> {
    provider: LocationProvider<G, S>,
    coordinator: Arc<ProximityQueryCoordinator<A>>,
    map: MapRenderer<F>,
    kind: ResultKind,
    radius_km: f64,
    phase: DiscoveryPhase,
    location_banner_dismissed: bool,
}

impl<G, S, A, F> NearbyPage<G, S, A, F>
where
    G: GeolocationSource,
    S: KeyValueStore,
    A: NearbySearch,
    F: SurfaceFactory,
{
    /// Builds the page with the map showing its placeholder until a position
    /// is known.
    pub fn new(
        provider: LocationProvider<G, S>,
        coordinator: Arc<ProximityQueryCoordinator<A>>,
        factory: F,
        kind: ResultKind,
        radius_km: f64,
    ) -> Self {
        Self {
            provider,
            coordinator,
            map: MapRenderer::mount(factory, MAP_CONTAINER, Coordinates::default(), NEARBY_ZOOM),
            kind,
            radius_km: clamp_radius_km(radius_km),
            phase: DiscoveryPhase::NoLocation,
            location_banner_dismissed: false,
        }
    }

    /// Runs the first-use location policy and, if a position results, the
    /// first nearby query.
    pub async fn open(&mut self) -> &DiscoveryPhase {
        self.phase = DiscoveryPhase::AcquiringLocation;
        self.location_banner_dismissed = false;
        let status = self.provider.initialize().await;
        self.apply_location_status(status).await;
        &self.phase
    }

    /// User-triggered acquisition. The only way out of `LocationError`.
    pub async fn retry_location(&mut self) -> &DiscoveryPhase {
        self.phase = DiscoveryPhase::AcquiringLocation;
        self.location_banner_dismissed = false;
        let status = match self.provider.get_current_location().await {
            Ok(position) => LocationStatus::Available(position),
            Err(err) => LocationStatus::Error(err),
        };
        self.apply_location_status(status).await;
        &self.phase
    }

    /// Moves the radius slider. Re-queries when a position is known. Returns
    /// the clamped value.
    pub async fn set_radius_km(&mut self, km: f64) -> f64 {
        self.radius_km = clamp_radius_km(km);
        self.refresh().await;
        self.radius_km
    }

    /// Re-issues the query for the current position and radius. Does
    /// nothing without a position.
    pub async fn refresh(&mut self) {
        if let DiscoveryPhase::LocationAvailable { position, .. } = self.phase {
            self.query(position).await;
        }
    }

    /// Adopts what the coordinator last settled on for this page's kind,
    /// such as results applied by a background subscription, together with
    /// the radius that produced them.
    pub fn sync_from_snapshot(&mut self, radius_km: f64) {
        self.radius_km = clamp_radius_km(radius_km);
        let DiscoveryPhase::LocationAvailable { position, .. } = self.phase else {
            return;
        };
        let next = query_phase_for(self.coordinator.snapshot(self.kind).status);
        self.render_markers();
        self.set_query_phase(position, next);
    }

    #[must_use]
    pub fn phase(&self) -> &DiscoveryPhase {
        &self.phase
    }

    #[must_use]
    pub fn kind(&self) -> ResultKind {
        self.kind
    }

    #[must_use]
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    #[must_use]
    pub fn map(&self) -> &MapRenderer<F> {
        &self.map
    }

    #[must_use]
    pub fn coordinator(&self) -> &Arc<ProximityQueryCoordinator<A>> {
        &self.coordinator
    }

    #[must_use]
    pub fn list_items(&self) -> Vec<ListItem> {
        self.coordinator
            .results(self.kind)
            .iter()
            .map(|r| ListItem {
                id: r.id.clone(),
                name: r.name.clone(),
                address: r.address_label(),
                distance: r.distance_label(),
            })
            .collect()
    }

    /// Empty-state text and hint, shown only after a successful query with
    /// no results.
    #[must_use]
    pub fn empty_message(&self) -> Option<(String, &'static str)> {
        let showing_results = matches!(
            self.phase,
            DiscoveryPhase::LocationAvailable {
                query: QueryPhase::ResultsAvailable,
                ..
            }
        );
        if !showing_results || !self.coordinator.results(self.kind).is_empty() {
            return None;
        }
        Some((
            format!(
                "No {} found within {} of your location.",
                self.kind,
                format_radius_km(self.radius_km)
            ),
            EMPTY_HINT,
        ))
    }

    /// The banner currently shown, location errors first.
    #[must_use]
    pub fn banner(&self) -> Option<String> {
        match &self.phase {
            DiscoveryPhase::LocationError(_) if self.location_banner_dismissed => None,
            DiscoveryPhase::LocationError(err) => Some(err.user_message()),
            _ => self.coordinator.snapshot(self.kind).error,
        }
    }

    /// Dismisses the banner currently shown. A location error stays the
    /// phase until a retry; query results stay as they are.
    pub fn dismiss_banner(&mut self) {
        if matches!(self.phase, DiscoveryPhase::LocationError(_)) {
            self.location_banner_dismissed = true;
        } else {
            self.coordinator.dismiss_error(self.kind);
        }
    }

    /// Tears the page down, releasing the map surface.
    pub fn close(self) {
        self.map.unmount();
    }

    async fn apply_location_status(&mut self, status: LocationStatus) {
        match status {
            LocationStatus::Available(position) => {
                self.map.update_center(position.into(), NEARBY_ZOOM);
                self.query(position).await;
            }
            LocationStatus::Error(err) => {
                tracing::debug!(error = %err, "nearby page has no location");
                self.phase = DiscoveryPhase::LocationError(err);
            }
            LocationStatus::Idle | LocationStatus::Loading => {
                self.phase = DiscoveryPhase::NoLocation;
            }
        }
    }

    async fn query(&mut self, position: Position) {
        self.phase = DiscoveryPhase::LocationAvailable {
            position,
            query: QueryPhase::Querying,
        };

        let radius = match Radius::from_km(self.radius_km) {
            Ok(radius) => radius,
            Err(e) => {
                tracing::warn!(radius_km = self.radius_km, error = %e, "radius rejected");
                self.set_query_phase(position, QueryPhase::QueryError);
                return;
            }
        };

        let next = match self.coordinator.search(position, radius, self.kind).await {
            Ok(SearchOutcome::Applied(_)) => QueryPhase::ResultsAvailable,
            // A newer query owns the phase; mirror whatever it has settled on.
            Ok(SearchOutcome::Superseded { .. }) => {
                query_phase_for(self.coordinator.snapshot(self.kind).status)
            }
            Err(_) => QueryPhase::QueryError,
        };

        self.render_markers();
        self.set_query_phase(position, next);
    }

    fn render_markers(&mut self) {
        let candidates = self
            .coordinator
            .results(self.kind)
            .iter()
            .map(MarkerCandidate::from)
            .collect();
        self.map.set_markers(candidates);
    }

    fn set_query_phase(&mut self, position: Position, query: QueryPhase) {
        self.phase = DiscoveryPhase::LocationAvailable { position, query };
    }
}

fn query_phase_for(status: QueryStatus) -> QueryPhase {
    match status {
        QueryStatus::Ready => QueryPhase::ResultsAvailable,
        QueryStatus::Failed => QueryPhase::QueryError,
        QueryStatus::Idle | QueryStatus::Loading => QueryPhase::Querying,
    }
}

#[cfg(test)]
#[path = "page_test.rs"]
mod tests;
