//! Undo/redo for designer state.

use super::{DesignerState, SceneChange};
use crate::canvas::ZoomProvider;
use crate::error::HistoryError;
use crate::history::{restore, RestoreReport};

impl DesignerState {
    /// Rebuild the scene from the previous snapshot
    pub fn undo(&mut self) -> Result<RestoreReport, HistoryError> {
        let zoom = self.viewport.zoom();
        let snapshot = self.history.undo()?;
        let report = restore(&mut self.scene, snapshot, zoom);
        Ok(self.finish_restore(report))
    }

    /// Rebuild the scene from the next snapshot
    pub fn redo(&mut self) -> Result<RestoreReport, HistoryError> {
        let zoom = self.viewport.zoom();
        let snapshot = self.history.redo()?;
        let report = restore(&mut self.scene, snapshot, zoom);
        Ok(self.finish_restore(report))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn finish_restore(&mut self, report: RestoreReport) -> RestoreReport {
        if self.grid.is_visible() {
            self.redraw_grid();
        }
        self.is_modified = true;
        self.notify(SceneChange::Restored {
            restored: report.restored,
            skipped: report.skipped.len(),
        });
        report
    }
}
