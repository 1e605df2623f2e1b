//! Live canvas state: the object scene, the zoom viewport and the grid overlay.

mod grid;
mod scene;
mod viewport;

pub use grid::{GridOverlay, GRID_TAG, MAX_GRID_LINES, MIN_GRID_SPACING};
pub use scene::Scene;
pub use viewport::{Viewport, ZoomProvider, MAX_ZOOM, MIN_ZOOM};
