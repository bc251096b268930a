//! Lifecycle-bound owner of one map surface.
//!
//! A [`MapRenderer`] is either showing a placeholder (no surface exists) or
//! holding exactly one live surface. Coordinates are validated here, before
//! anything reaches the surface. The surface is released exactly once: by
//! [`MapRenderer::unmount`], or on drop if the renderer was never unmounted.

use shopnear_core::{Coordinates, MapMarker, NearbyResult, Position};

use crate::surface::{MapSurface, MarkerId, SurfaceFactory, TileLayer};

pub const DEFAULT_ZOOM: u8 = 13;
pub const PLACEHOLDER_TEXT: &str = "Location not available";
pub const CENTER_MARKER_LABEL: &str = "Selected Location";

/// An unvalidated marker as supplied by callers.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerCandidate {
    pub coordinates: Coordinates,
    pub label: String,
}

impl MarkerCandidate {
    #[must_use]
    pub fn new(coordinates: Coordinates, label: impl Into<String>) -> Self {
        Self {
            coordinates,
            label: label.into(),
        }
    }
}

impl From<&NearbyResult> for MarkerCandidate {
    fn from(result: &NearbyResult) -> Self {
        Self::new(
            result.position.map(Coordinates::from).unwrap_or_default(),
            result.name.clone(),
        )
    }
}

struct LiveSurface<S> {
    surface: S,
    center: Position,
    zoom: u8,
    center_marker: MarkerId,
    markers: Vec<MarkerId>,
}

pub struct MapRenderer<F: SurfaceFactory> {
    factory: F,
    container: String,
    live: Option<LiveSurface<F::Surface>>,
    /// Last candidate list, replayed when a placeholder turns into a surface.
    candidates: Vec<MarkerCandidate>,
}

impl<F: SurfaceFactory> MapRenderer<F> {
    /// Mounts a renderer into `container`.
    ///
    /// An invalid `center` leaves the renderer showing [`PLACEHOLDER_TEXT`]
    /// and no surface is created.
    #[must_use]
    pub fn mount(
        factory: F,
        container: impl Into<String>,
        center: Coordinates,
        zoom: u8,
    ) -> Self {
        let mut renderer = Self {
            factory,
            container: container.into(),
            live: None,
            candidates: Vec::new(),
        };
        match center.validate() {
            Ok(position) => renderer.create_surface(position, zoom),
            Err(e) => {
                tracing::debug!(
                    container = %renderer.container,
                    error = %e,
                    "map center invalid; showing placeholder"
                );
            }
        }
        renderer
    }

    /// Replaces all markers with the valid subset of `candidates` and returns
    /// how many were rendered. Invalid candidates are logged and skipped.
    pub fn set_markers(&mut self, candidates: Vec<MarkerCandidate>) -> usize {
        self.candidates = candidates;
        self.render_markers()
    }

    /// Re-centers the live surface in place. With only a placeholder, a
    /// valid center mounts the surface. An invalid center is ignored.
    pub fn update_center(&mut self, center: Coordinates, zoom: u8) {
        let position = match center.validate() {
            Ok(position) => position,
            Err(e) => {
                tracing::warn!(
                    container = %self.container,
                    error = %e,
                    "ignoring invalid map center"
                );
                return;
            }
        };

        let Some(live) = self.live.as_mut() else {
            self.create_surface(position, zoom);
            self.render_markers();
            return;
        };

        live.surface.set_view(position, zoom);
        live.surface.remove_marker(live.center_marker);
        live.center_marker = live
            .surface
            .add_marker(&MapMarker::new(position, CENTER_MARKER_LABEL));
        live.center = position;
        live.zoom = zoom;
    }

    /// Releases the surface. Consuming `self` rules out use after unmount.
    pub fn unmount(mut self) {
        self.release_surface();
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.live.is_none()
    }

    /// Text shown instead of a map, if any.
    #[must_use]
    pub fn placeholder(&self) -> Option<&'static str> {
        self.is_placeholder().then_some(PLACEHOLDER_TEXT)
    }

    /// Current center and zoom of the live surface.
    #[must_use]
    pub fn view(&self) -> Option<(Position, u8)> {
        self.live.as_ref().map(|l| (l.center, l.zoom))
    }

    /// Number of result markers on the surface, excluding the center marker.
    #[must_use]
    pub fn marker_count(&self) -> usize {
        self.live.as_ref().map_or(0, |l| l.markers.len())
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    fn create_surface(&mut self, center: Position, zoom: u8) {
        let mut surface = self.factory.create(&self.container);
        surface.set_view(center, zoom);
        surface.add_tile_layer(&TileLayer::openstreetmap());
        let center_marker = surface.add_marker(&MapMarker::new(center, CENTER_MARKER_LABEL));
        tracing::debug!(container = %self.container, %center, zoom, "map surface mounted");
        self.live = Some(LiveSurface {
            surface,
            center,
            zoom,
            center_marker,
            markers: Vec::new(),
        });
    }

    fn render_markers(&mut self) -> usize {
        let Some(live) = self.live.as_mut() else {
            return 0;
        };

        for id in live.markers.drain(..) {
            live.surface.remove_marker(id);
        }

        for candidate in &self.candidates {
            match candidate.coordinates.validate() {
                Ok(position) => {
                    let id = live
                        .surface
                        .add_marker(&MapMarker::new(position, candidate.label.clone()));
                    live.markers.push(id);
                }
                Err(e) => {
                    tracing::debug!(label = %candidate.label, error = %e, "skipping marker");
                }
            }
        }
        live.markers.len()
    }

    fn release_surface(&mut self) {
        if let Some(mut live) = self.live.take() {
            live.surface.release();
            tracing::debug!(container = %self.container, "map surface released");
        }
    }
}

impl<F: SurfaceFactory> Drop for MapRenderer<F> {
    fn drop(&mut self) {
        self.release_surface();
    }
}

#[cfg(test)]
#[path = "renderer_test.rs"]
mod tests;
