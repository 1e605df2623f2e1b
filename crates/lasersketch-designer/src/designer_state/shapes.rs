//! Shape creation and deletion for designer state.

use super::DesignerState;
use crate::model::{Shape, StrokeStyle};

impl DesignerState {
    /// Add a user shape and record the change; returns its id
    pub fn add_shape(&mut self, shape: Shape, stroke: StrokeStyle) -> u64 {
        let id = self.scene.add(shape, stroke);
        self.commit();
        id
    }

    /// Delete a user shape and record the change
    ///
    /// Overlay objects cannot be deleted this way.
    pub fn delete_shape(&mut self, id: u64) -> bool {
        match self.scene.get(id) {
            Some(obj) if obj.is_durable() => {}
            _ => return false,
        }
        self.scene.remove(id);
        self.commit();
        true
    }

    /// Number of user shapes in the scene
    pub fn shape_count(&self) -> usize {
        self.scene.durable_objects().count()
    }
}
