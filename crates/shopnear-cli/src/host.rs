//! Wires configuration into concrete providers, clients and surfaces.

use std::sync::Arc;
use std::time::Duration;

use shopnear_core::{AppConfig, Position, ResultKind};
use shopnear_location::{
    FileStore, FixedSource, GeolocationSource, LocationError, LocationProvider, PositionOptions,
    UnsupportedSource,
};
use shopnear_map::SceneFactory;
use shopnear_search::{NearbyClient, ProximityQueryCoordinator};

use crate::page::NearbyPage;

/// Geolocation available to a command-line host: either a known position
/// (configured device position or `--lat/--lng`) or none at all.
#[derive(Debug, Clone, Copy)]
pub(crate) enum HostSource {
    Fixed(FixedSource),
    Unsupported(UnsupportedSource),
}

impl HostSource {
    pub(crate) fn from_position(position: Option<Position>) -> Self {
        position.map_or(HostSource::Unsupported(UnsupportedSource), |p| {
            HostSource::Fixed(FixedSource::new(p))
        })
    }
}

impl GeolocationSource for HostSource {
    async fn request_position(&self, options: &PositionOptions) -> Result<Position, LocationError> {
        match self {
            HostSource::Fixed(source) => source.request_position(options).await,
            HostSource::Unsupported(source) => source.request_position(options).await,
        }
    }
}

pub(crate) type HostProvider = LocationProvider<HostSource, FileStore>;
pub(crate) type HostPage = NearbyPage<HostSource, FileStore, NearbyClient, SceneFactory>;

pub(crate) fn position_options(config: &AppConfig) -> PositionOptions {
    PositionOptions {
        high_accuracy: true,
        timeout: Duration::from_millis(config.geolocation_timeout_ms),
        max_cached_age: Duration::from_millis(config.geolocation_max_age_ms),
    }
}

pub(crate) fn build_provider(config: &AppConfig, position: Option<Position>) -> HostProvider {
    let source = HostSource::from_position(position.or(config.device_position));
    LocationProvider::new(source, FileStore::new(config.storage_path.clone()))
        .with_options(position_options(config))
        .with_ttl(Duration::from_secs(config.location_ttl_secs))
}

pub(crate) fn build_coordinator(
    config: &AppConfig,
) -> anyhow::Result<Arc<ProximityQueryCoordinator<NearbyClient>>> {
    let client = NearbyClient::new(
        &config.api_url,
        config.request_timeout_secs,
        &config.user_agent,
    )?;
    Ok(Arc::new(ProximityQueryCoordinator::new(client)))
}

pub(crate) fn build_page(
    config: &AppConfig,
    kind: ResultKind,
    radius_km: Option<f64>,
    position: Option<Position>,
) -> anyhow::Result<(HostPage, SceneFactory)> {
    let factory = SceneFactory::default();
    let page = NearbyPage::new(
        build_provider(config, position),
        build_coordinator(config)?,
        factory.clone(),
        kind,
        radius_km.unwrap_or(config.default_radius_km),
    );
    Ok((page, factory))
}
