//! The seam between [`crate::MapRenderer`] and a concrete map widget.

use shopnear_core::{MapMarker, Position};

/// Raster tile source added to every mounted surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl TileLayer {
    #[must_use]
    pub fn openstreetmap() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
            max_zoom: 19,
        }
    }
}

impl Default for TileLayer {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

/// Handle for a marker placed on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(pub u64);

/// One live interactive map instance.
///
/// Implementations only ever see validated [`Position`]s and [`MapMarker`]s.
pub trait MapSurface {
    fn set_view(&mut self, center: Position, zoom: u8);

    fn add_tile_layer(&mut self, layer: &TileLayer);

    fn add_marker(&mut self, marker: &MapMarker) -> MarkerId;

    fn remove_marker(&mut self, id: MarkerId);

    /// Detaches the surface from its container and frees its bindings.
    fn release(&mut self);
}

/// Creates surfaces bound to a named container.
pub trait SurfaceFactory {
    type Surface: MapSurface;

    fn create(&mut self, container: &str) -> Self::Surface;
}
