//! File I/O operations (save, load, new) for designer state.

use super::{DesignerState, SceneChange};
use crate::canvas::ZoomProvider;
use crate::history::{restore, RestoreReport};
use crate::serialization::SceneDocument;

impl DesignerState {
    /// Save design to file.
    pub fn save_to_file(&mut self, path: impl AsRef<std::path::Path>) -> anyhow::Result<()> {
        let design = SceneDocument::from_scene(&self.design_name, &self.scene, self.zoom());
        design.save_to_file(&path)?;

        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.is_modified = false;

        Ok(())
    }

    /// Load design from file, replacing the scene and starting a fresh history.
    ///
    /// Records that cannot be rebuilt are skipped; the report lists them.
    pub fn load_from_file(
        &mut self,
        path: impl AsRef<std::path::Path>,
    ) -> anyhow::Result<RestoreReport> {
        let design = SceneDocument::load_from_file(&path)?;

        let zoom = self.zoom();
        let report = restore(&mut self.scene, &design.to_snapshot(), zoom);
        self.redraw_grid();

        self.history.clear();
        self.history.record(&self.scene, zoom);

        self.design_name = design.metadata.name;
        self.current_file_path = Some(path.as_ref().to_path_buf());
        self.is_modified = false;

        self.notify(SceneChange::Loaded {
            restored: report.restored,
            skipped: report.skipped.len(),
        });
        Ok(report)
    }

    /// Remove all shapes and start a fresh history.
    pub fn new_design(&mut self) {
        self.scene.clear_durable();
        self.history.clear();
        self.history.record(&self.scene, self.viewport.zoom());
        self.design_name = "Untitled".to_string();
        self.current_file_path = None;
        self.is_modified = false;
        self.notify(SceneChange::Cleared);
    }
}
