//! # LaserSketch Designer
//!
//! The vector scene behind the drawing canvas: drawable primitives, the live
//! scene and its overlays, a bounded snapshot history for undo/redo, and
//! design files on disk.

pub mod canvas;
pub mod designer_state;
pub mod error;
pub mod history;
pub mod model;
pub mod serialization;

pub use canvas::{GridOverlay, Scene, Viewport, ZoomProvider, MIN_GRID_SPACING};
pub use designer_state::{DesignerState, ListenerId, SceneChange};
pub use error::{HistoryError, RestoreItemError};
pub use history::{restore, RestoreReport, SceneHistory, SceneSnapshot, DEFAULT_HISTORY_DEPTH};
pub use model::{
    is_ephemeral_tag, ArcStyle, BoundingBox, DrawableObject, Point, Shape, ShapeKind,
    ShapeRecord, StrokeStyle, EPHEMERAL_TAGS, SHAPE_TAG,
};
pub use serialization::{DocumentMetadata, SceneDocument};
