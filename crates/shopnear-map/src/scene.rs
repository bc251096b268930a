//! In-memory map surface.
//!
//! [`SceneFactory`] hands out [`SceneSurface`]s that record every call into a
//! shared [`Scene`]. The CLI prints the scene as text; tests use it to count
//! surfaces created and released.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shopnear_core::{MapMarker, Position};

use crate::surface::{MapSurface, MarkerId, SurfaceFactory, TileLayer};

/// Recorded state of one surface.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneSnapshot {
    pub container: String,
    pub center: Option<Position>,
    pub zoom: Option<u8>,
    pub tile_layers: Vec<TileLayer>,
    pub markers: BTreeMap<MarkerId, MapMarker>,
    /// Number of times `release` was called. Anything above one is a bug.
    pub releases: usize,
}

impl SceneSnapshot {
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.releases > 0
    }
}

impl fmt::Display for SceneSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.center, self.zoom) {
            (Some(center), Some(zoom)) => writeln!(
                f,
                "map #{} centered on {center} (zoom {zoom})",
                self.container
            )?,
            _ => writeln!(f, "map #{} (no view)", self.container)?,
        }
        for marker in self.markers.values() {
            writeln!(f, "  * {} {}", marker.label, marker.position)?;
        }
        Ok(())
    }
}

/// Shared record of every surface a [`SceneFactory`] has created.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    surfaces: Arc<Mutex<Vec<SceneSnapshot>>>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn surfaces_created(&self) -> usize {
        self.lock().len()
    }

    /// Total `release` calls across all surfaces.
    #[must_use]
    pub fn surfaces_released(&self) -> usize {
        self.lock().iter().map(|s| s.releases).sum()
    }

    #[must_use]
    pub fn surface(&self, index: usize) -> Option<SceneSnapshot> {
        self.lock().get(index).cloned()
    }

    /// The most recently created surface that has not been released.
    #[must_use]
    pub fn live(&self) -> Option<SceneSnapshot> {
        self.lock().iter().rev().find(|s| !s.is_released()).cloned()
    }

    fn push(&self, container: &str) -> usize {
        let mut surfaces = self.lock();
        surfaces.push(SceneSnapshot {
            container: container.to_string(),
            ..SceneSnapshot::default()
        });
        surfaces.len() - 1
    }

    fn with_surface(&self, index: usize, f: impl FnOnce(&mut SceneSnapshot)) {
        if let Some(surface) = self.lock().get_mut(index) {
            f(surface);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SceneSnapshot>> {
        self.surfaces.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
pub struct SceneSurface {
    scene: Scene,
    index: usize,
    next_marker: u64,
}

impl MapSurface for SceneSurface {
    fn set_view(&mut self, center: Position, zoom: u8) {
        self.scene.with_surface(self.index, |s| {
            s.center = Some(center);
            s.zoom = Some(zoom);
        });
    }

    fn add_tile_layer(&mut self, layer: &TileLayer) {
        self.scene
            .with_surface(self.index, |s| s.tile_layers.push(layer.clone()));
    }

    fn add_marker(&mut self, marker: &MapMarker) -> MarkerId {
        self.next_marker += 1;
        let id = MarkerId(self.next_marker);
        self.scene.with_surface(self.index, |s| {
            s.markers.insert(id, marker.clone());
        });
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.scene.with_surface(self.index, |s| {
            s.markers.remove(&id);
        });
    }

    fn release(&mut self) {
        self.scene.with_surface(self.index, |s| {
            s.releases += 1;
            s.markers.clear();
            s.tile_layers.clear();
        });
    }
}

/// Factory recording into a shared [`Scene`].
#[derive(Debug, Clone, Default)]
pub struct SceneFactory {
    scene: Scene,
}

impl SceneFactory {
    #[must_use]
    pub fn new(scene: Scene) -> Self {
        Self { scene }
    }

    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl SurfaceFactory for SceneFactory {
    type Surface = SceneSurface;

    fn create(&mut self, container: &str) -> SceneSurface {
        let index = self.scene.push(container);
        SceneSurface {
            scene: self.scene.clone(),
            index,
            next_marker: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_calls_are_recorded() {
        let scene = Scene::new();
        let mut factory = SceneFactory::new(scene.clone());
        let mut surface = factory.create("nearby-map");

        let here = Position::new(19.076, 72.8777).unwrap();
        surface.set_view(here, 12);
        surface.add_tile_layer(&TileLayer::openstreetmap());
        let id = surface.add_marker(&MapMarker::new(here, "Here"));

        let snapshot = scene.live().unwrap();
        assert_eq!(snapshot.container, "nearby-map");
        assert_eq!(snapshot.center, Some(here));
        assert_eq!(snapshot.zoom, Some(12));
        assert_eq!(snapshot.tile_layers[0].max_zoom, 19);
        assert_eq!(snapshot.markers.len(), 1);

        surface.remove_marker(id);
        assert!(scene.live().unwrap().markers.is_empty());

        surface.release();
        assert!(scene.live().is_none());
        assert_eq!(scene.surfaces_created(), 1);
        assert_eq!(scene.surfaces_released(), 1);
    }

    #[test]
    fn snapshot_renders_as_text() {
        let here = Position::new(19.076, 72.8777).unwrap();
        let mut markers = BTreeMap::new();
        markers.insert(MarkerId(1), MapMarker::new(here, "Selected Location"));
        let snapshot = SceneSnapshot {
            container: "map".to_string(),
            center: Some(here),
            zoom: Some(13),
            markers,
            ..SceneSnapshot::default()
        };
        assert_eq!(
            snapshot.to_string(),
            "map #map centered on (19.076, 72.8777) (zoom 13)\n  * Selected Location (19.076, 72.8777)\n"
        );
    }
}
