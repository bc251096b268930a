//! `nearby` and `watch` command handlers.
//!
//! Both open the nearby page against the configured API. `nearby` prints one
//! result set; `watch` keeps the page open and re-queries as radius values
//! arrive on stdin.

use std::time::Duration;

use shopnear_core::{AppConfig, Position, Radius, ResultKind};
use shopnear_map::SceneFactory;
use shopnear_search::{spawn_subscription, QueryStatus, SubscriptionConfig};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::host::{build_page, HostPage};
use crate::page::{clamp_radius_km, DiscoveryPhase, QueryPhase};

/// Opens the page once and prints what it shows.
///
/// # Errors
///
/// Returns an error only if the API client cannot be built. Location and
/// query failures are printed as banners.
pub(crate) async fn run_nearby(
    config: &AppConfig,
    kind: ResultKind,
    radius_km: Option<f64>,
    position: Option<Position>,
    retry_location: bool,
) -> anyhow::Result<()> {
    let (mut page, factory) = build_page(config, kind, radius_km, position)?;

    page.open().await;
    if retry_location && matches!(page.phase(), DiscoveryPhase::LocationError(_)) {
        page.retry_location().await;
    }

    print_page(&page, &factory);
    page.close();
    Ok(())
}

/// Keeps the page open and re-queries on every settled radius read from
/// stdin, one number (km) per line. Ends on EOF.
///
/// # Errors
///
/// Returns an error if the API client cannot be built or stdin fails.
pub(crate) async fn run_watch(
    config: &AppConfig,
    kind: ResultKind,
    radius_km: Option<f64>,
    position: Option<Position>,
) -> anyhow::Result<()> {
    let (mut page, factory) = build_page(config, kind, radius_km, position)?;
    page.open().await;
    print_page(&page, &factory);

    let DiscoveryPhase::LocationAvailable { position, .. } = *page.phase() else {
        page.close();
        return Ok(());
    };

    let initial_radius = Radius::from_km(page.radius_km())?;
    let (position_tx, position_rx) = watch::channel(Some(position));
    let (radius_tx, radius_rx) = watch::channel(initial_radius);
    let subscription = spawn_subscription(
        std::sync::Arc::clone(page.coordinator()),
        position_rx,
        radius_rx,
        SubscriptionConfig {
            kind,
            radius_debounce: Duration::from_millis(config.radius_debounce_ms),
            // `open` already queried the initial position and radius.
            skip_initial_query: true,
        },
    );

    let coordinator = std::sync::Arc::clone(page.coordinator());
    let mut printed_generation = coordinator.current_generation(kind);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_millis(100));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match line.trim().parse::<f64>() {
                    Ok(km) => {
                        let clamped = clamp_radius_km(km);
                        radius_tx.send_replace(Radius::from_km(clamped)?);
                        println!("radius: {clamped} km");
                    }
                    Err(_) => eprintln!("expected a radius in km, got {line:?}"),
                }
            }
            _ = ticker.tick() => {
                let snapshot = coordinator.snapshot(kind);
                let settled = matches!(snapshot.status, QueryStatus::Ready | QueryStatus::Failed);
                if settled && snapshot.generation != printed_generation {
                    printed_generation = snapshot.generation;
                    let queried_km = snapshot
                        .last_query
                        .map_or(page.radius_km(), |q| q.radius.km());
                    page.sync_from_snapshot(queried_km);
                    print_results(&page, snapshot.status == QueryStatus::Ready);
                }
            }
        }
    }

    drop(position_tx);
    drop(radius_tx);
    subscription.await?;
    page.close();
    Ok(())
}

fn print_page(page: &HostPage, factory: &SceneFactory) {
    match page.phase() {
        DiscoveryPhase::LocationError(_) | DiscoveryPhase::NoLocation => {
            if let Some(banner) = page.banner() {
                println!("{banner}");
            }
            println!("{}", page.map().placeholder().unwrap_or_default());
        }
        DiscoveryPhase::AcquiringLocation => println!("Getting your location..."),
        DiscoveryPhase::LocationAvailable { query, .. } => {
            if let Some(scene) = factory.scene().live() {
                print!("{scene}");
            }
            print_results(page, *query == QueryPhase::ResultsAvailable);
        }
    }
}

fn print_results(page: &HostPage, succeeded: bool) {
    if let Some(banner) = page.banner() {
        println!("! {banner}");
    }
    if succeeded {
        if let Some((message, hint)) = page.empty_message() {
            println!("{message}");
            println!("{hint}");
            return;
        }
    }
    for item in page.list_items() {
        println!("{:<32} {:>10}  {}", item.name, item.distance, item.address);
    }
}
