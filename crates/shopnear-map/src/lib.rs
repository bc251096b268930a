pub mod renderer;
pub mod scene;
pub mod surface;

pub use renderer::{
    MapRenderer, MarkerCandidate, CENTER_MARKER_LABEL, DEFAULT_ZOOM, PLACEHOLDER_TEXT,
};
pub use scene::{Scene, SceneFactory, SceneSnapshot, SceneSurface};
pub use surface::{MapSurface, MarkerId, SurfaceFactory, TileLayer};
