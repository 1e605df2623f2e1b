//! Designer state manager for UI integration.
//!
//! Owns the live scene with its viewport, grid and snapshot history, and
//! tells registered listeners when the scene is replaced wholesale.
//!
//! Split into submodules:
//! - `history`: undo/redo
//! - `shapes`: shape creation and deletion
//! - `file_io`: save, load, new

mod file_io;
mod history;
mod shapes;

use std::fmt;
use std::path::PathBuf;

use crate::canvas::{GridOverlay, Scene, Viewport, ZoomProvider};
use crate::history::{SceneHistory, DEFAULT_HISTORY_DEPTH};

/// Handle returned by `on_scene_changed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Whole-scene replacement, delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChange {
    /// Undo or redo rebuilt the scene from history
    Restored { restored: usize, skipped: usize },
    /// A design file replaced the scene
    Loaded { restored: usize, skipped: usize },
    /// All shapes were removed
    Cleared,
}

type SceneListener = Box<dyn FnMut(&SceneChange) + Send>;

/// Designer state for UI integration
pub struct DesignerState {
    scene: Scene,
    history: SceneHistory,
    viewport: Viewport,
    grid: GridOverlay,
    pub design_name: String,
    pub current_file_path: Option<PathBuf>,
    pub is_modified: bool,
    listeners: Vec<(ListenerId, SceneListener)>,
    next_listener: u64,
}

impl DesignerState {
    pub fn new() -> Self {
        Self::with_options(DEFAULT_HISTORY_DEPTH, GridOverlay::default())
    }

    /// Create with a history depth and grid settings
    ///
    /// The empty starting scene is recorded so the first edit can be undone.
    pub fn with_options(history_depth: usize, grid: GridOverlay) -> Self {
        let mut state = Self {
            scene: Scene::new(),
            history: SceneHistory::with_depth(history_depth),
            viewport: Viewport::new(),
            grid,
            design_name: "Untitled".to_string(),
            current_file_path: None,
            is_modified: false,
            listeners: Vec::new(),
            next_listener: 1,
        };
        state.redraw_grid();
        state.history.record(&state.scene, state.viewport.zoom());
        state
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Mutable scene access; call `commit` after a durable change
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn history(&self) -> &SceneHistory {
        &self.history
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn grid(&self) -> &GridOverlay {
        &self.grid
    }

    pub fn zoom(&self) -> f64 {
        self.viewport.zoom()
    }

    /// Record the current scene in history; returns the new history length
    pub fn commit(&mut self) -> usize {
        let evicted = self.history.record(&self.scene, self.viewport.zoom());
        if evicted > 0 {
            tracing::debug!("History full, evicted {} snapshot(s)", evicted);
        }
        self.is_modified = true;
        self.history.len()
    }

    /// Change zoom, rescaling the live shapes and the grid
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        let old = self.viewport.zoom();
        if !self.viewport.set_zoom(zoom) {
            return false;
        }
        self.scene.scale_durable(zoom / old);
        self.redraw_grid();
        true
    }

    pub fn set_grid_visible(&mut self, visible: bool) {
        self.grid.set_visible(visible);
        self.redraw_grid();
    }

    pub fn set_grid_spacing(&mut self, spacing: f64) -> bool {
        if !self.grid.set_spacing(spacing) {
            return false;
        }
        self.redraw_grid();
        true
    }

    /// Register a listener for whole-scene replacements
    pub fn on_scene_changed<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&SceneChange) + Send + 'static,
    {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        before != self.listeners.len()
    }

    fn notify(&mut self, change: SceneChange) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&change);
        }
    }

    fn redraw_grid(&mut self) {
        self.grid.redraw(&mut self.scene, self.viewport.zoom());
    }
}

impl Default for DesignerState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DesignerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DesignerState")
            .field("design_name", &self.design_name)
            .field("objects", &self.scene.len())
            .field("history", &self.history.len())
            .field("cursor", &self.history.cursor())
            .field("zoom", &self.viewport.zoom())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Shape, StrokeStyle};

    #[test]
    fn test_starts_with_empty_snapshot() {
        let state = DesignerState::new();
        assert_eq!(state.history().len(), 1);
        assert!(state.history().current().unwrap().is_empty());
        assert!(!state.is_modified);
    }

    #[test]
    fn test_zoom_rescales_live_shapes() {
        let mut state = DesignerState::new();
        state.add_shape(
            Shape::Rectangle {
                bounds: BoundingBox::new(10.0, 10.0, 20.0, 20.0),
            },
            StrokeStyle::new("black", 1.0),
        );

        assert!(state.set_zoom(2.0));
        let obj = &state.scene().objects()[0];
        assert_eq!(
            obj.shape,
            Shape::Rectangle {
                bounds: BoundingBox::new(20.0, 20.0, 40.0, 40.0),
            }
        );
        assert_eq!(obj.stroke.width, 2.0);
        assert!(!state.set_zoom(-1.0));
    }

    #[test]
    fn test_remove_listener() {
        let mut state = DesignerState::new();
        let id = state.on_scene_changed(|_| {});
        assert!(state.remove_listener(id));
        assert!(!state.remove_listener(id));
    }
}
