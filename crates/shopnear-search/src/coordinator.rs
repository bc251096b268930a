//! Proximity query coordination with per-kind supersession.
//!
//! Each [`ResultKind`] carries a monotonically increasing generation. Issuing
//! a query bumps the generation; a response mutates visible state only if
//! its generation is still current when it arrives. Stale responses, success
//! or failure, are dropped and reported as [`SearchOutcome::Superseded`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shopnear_core::{NearbyResult, Position, ProximityQuery, Radius, ResultKind};

use crate::error::{CoordinatorError, SearchError};

/// The Nearby Search API as seen by the coordinator.
pub trait NearbySearch: Send + Sync {
    fn search_nearby(
        &self,
        query: &ProximityQuery,
    ) -> impl Future<Output = Result<Vec<NearbyResult>, SearchError>> + Send;
}

impl<T: NearbySearch> NearbySearch for Arc<T> {
    fn search_nearby(
        &self,
        query: &ProximityQuery,
    ) -> impl Future<Output = Result<Vec<NearbyResult>, SearchError>> + Send {
        (**self).search_nearby(query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Visible state for one result kind.
#[derive(Debug, Clone, Default)]
pub struct KindSnapshot {
    pub status: QueryStatus,
    /// Last successfully applied result set. Kept across failures.
    pub results: Vec<NearbyResult>,
    /// Banner text for the most recent applied failure.
    pub error: Option<String>,
    pub last_query: Option<ProximityQuery>,
    pub generation: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// The response was current and is now the visible result set.
    Applied(Vec<NearbyResult>),
    /// A newer query for the same kind was issued first; the response was
    /// discarded.
    Superseded { generation: u64, current: u64 },
}

pub struct ProximityQueryCoordinator<A> {
    api: A,
    state: Mutex<HashMap<ResultKind, KindSnapshot>>,
}

impl<A: NearbySearch> ProximityQueryCoordinator<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Issues a nearby query, superseding any in-flight query of the same
    /// kind. Does not retry.
    ///
    /// # Errors
    ///
    /// Returns [`CoordinatorError::FetchFailed`] when the current query
    /// fails. The previous result set stays visible.
    pub async fn search(
        &self,
        position: Position,
        radius: Radius,
        kind: ResultKind,
    ) -> Result<SearchOutcome, CoordinatorError> {
        let query = ProximityQuery {
            position,
            radius,
            kind,
        };
        let generation = self.begin(query);
        tracing::debug!(%kind, generation, %position, radius_m = radius.meters(), "issuing nearby query");

        let response = self.api.search_nearby(&query).await;

        let mut states = self.lock();
        let state = states.entry(kind).or_default();
        if state.generation != generation {
            tracing::debug!(
                %kind,
                generation,
                current = state.generation,
                "dropping superseded nearby response"
            );
            return Ok(SearchOutcome::Superseded {
                generation,
                current: state.generation,
            });
        }

        match response {
            Ok(results) => {
                state.status = QueryStatus::Ready;
                state.error = None;
                state.results.clone_from(&results);
                Ok(SearchOutcome::Applied(results))
            }
            Err(source) => {
                let err = CoordinatorError::FetchFailed { kind, source };
                tracing::warn!(%kind, generation, error = %err, "nearby query failed");
                state.status = QueryStatus::Failed;
                state.error = Some(err.user_message());
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self, kind: ResultKind) -> KindSnapshot {
        self.lock().get(&kind).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn results(&self, kind: ResultKind) -> Vec<NearbyResult> {
        self.lock()
            .get(&kind)
            .map(|s| s.results.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn current_generation(&self, kind: ResultKind) -> u64 {
        self.lock().get(&kind).map_or(0, |s| s.generation)
    }

    /// Clears the banner for `kind` without touching results.
    pub fn dismiss_error(&self, kind: ResultKind) {
        if let Some(state) = self.lock().get_mut(&kind) {
            state.error = None;
        }
    }

    fn begin(&self, query: ProximityQuery) -> u64 {
        let mut states = self.lock();
        let state = states.entry(query.kind).or_default();
        state.generation += 1;
        state.status = QueryStatus::Loading;
        state.last_query = Some(query);
        state.generation
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ResultKind, KindSnapshot>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "coordinator_test.rs"]
mod tests;
