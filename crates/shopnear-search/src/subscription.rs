//! Re-issues nearby queries when position or radius change.
//!
//! The page publishes its current position and radius on `watch` channels;
//! [`spawn_subscription`] turns every settled change into a coordinator
//! query for one [`ResultKind`]. Radius changes are debounced so dragging a
//! slider issues one request, not one per intermediate value. When inputs
//! change while a request is in flight, the in-flight future is dropped
//! (aborting the HTTP request) on top of the coordinator's generation check.

use std::sync::Arc;
use std::time::Duration;

use shopnear_core::{Position, Radius, ResultKind};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::coordinator::{NearbySearch, ProximityQueryCoordinator, SearchOutcome};

#[derive(Debug, Clone, Copy)]
pub struct SubscriptionConfig {
    pub kind: ResultKind,
    /// Quiet period a radius value must survive before it is queried.
    pub radius_debounce: Duration,
    /// Wait for the first change instead of querying the initial values,
    /// for callers that already ran that query themselves.
    pub skip_initial_query: bool,
}

impl SubscriptionConfig {
    #[must_use]
    pub fn new(kind: ResultKind) -> Self {
        Self {
            kind,
            radius_debounce: Duration::from_millis(300),
            skip_initial_query: false,
        }
    }
}

/// What woke the loop up.
enum Change {
    Position,
    Radius,
    Closed,
}

/// Spawns the subscription task. It ends when either sender is dropped.
pub fn spawn_subscription<A>(
    coordinator: Arc<ProximityQueryCoordinator<A>>,
    positions: watch::Receiver<Option<Position>>,
    radii: watch::Receiver<Radius>,
    config: SubscriptionConfig,
) -> JoinHandle<()>
where
    A: NearbySearch + 'static,
{
    tokio::spawn(run(coordinator, positions, radii, config))
}

async fn run<A: NearbySearch>(
    coordinator: Arc<ProximityQueryCoordinator<A>>,
    mut positions: watch::Receiver<Option<Position>>,
    mut radii: watch::Receiver<Radius>,
    config: SubscriptionConfig,
) {
    let kind = config.kind;
    // The initial values count as a change unless already queried.
    let mut dirty = !config.skip_initial_query;

    loop {
        if !dirty {
            let change = tokio::select! {
                r = positions.changed() => if r.is_ok() { Change::Position } else { Change::Closed },
                r = radii.changed() => if r.is_ok() { Change::Radius } else { Change::Closed },
            };
            match change {
                Change::Closed => break,
                Change::Radius => {
                    if !settle(&mut radii, config.radius_debounce).await {
                        break;
                    }
                }
                Change::Position => {}
            }
        }
        dirty = false;

        let position = *positions.borrow_and_update();
        let radius = *radii.borrow_and_update();
        let Some(position) = position else {
            tracing::debug!(%kind, "no position yet; waiting");
            continue;
        };

        let interrupted = tokio::select! {
            outcome = coordinator.search(position, radius, kind) => {
                match outcome {
                    Ok(SearchOutcome::Applied(results)) => {
                        tracing::info!(%kind, count = results.len(), "nearby results updated");
                    }
                    Ok(SearchOutcome::Superseded { .. }) => {}
                    // Already recorded in the coordinator snapshot.
                    Err(e) => tracing::debug!(%kind, error = %e, "subscription query failed"),
                }
                None
            }
            r = positions.changed() => Some(if r.is_ok() { Change::Position } else { Change::Closed }),
            r = radii.changed() => Some(if r.is_ok() { Change::Radius } else { Change::Closed }),
        };

        match interrupted {
            None => {}
            Some(Change::Closed) => break,
            Some(Change::Radius) => {
                tracing::debug!(%kind, "inputs changed mid-flight; abandoning request");
                if !settle(&mut radii, config.radius_debounce).await {
                    break;
                }
                dirty = true;
            }
            Some(Change::Position) => {
                tracing::debug!(%kind, "inputs changed mid-flight; abandoning request");
                dirty = true;
            }
        }
    }

    tracing::debug!(%kind, "nearby subscription closed");
}

/// Waits until `radii` stays unchanged for `quiet`. Returns `false` if the
/// sender went away.
async fn settle(radii: &mut watch::Receiver<Radius>, quiet: Duration) -> bool {
    loop {
        match tokio::time::timeout(quiet, radii.changed()).await {
            Err(_) => return true,
            Ok(Ok(())) => {}
            Ok(Err(_)) => return false,
        }
    }
}
