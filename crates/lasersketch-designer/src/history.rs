//! Snapshot history for undo/redo.
//!
//! Every durable scene mutation pushes a whole-scene snapshot; undo and redo
//! move a cursor through the list and rebuild the live scene from the
//! snapshot under it. The list is bounded: the oldest snapshots are evicted
//! once the depth limit is reached.

use chrono::{DateTime, Utc};

use crate::canvas::Scene;
use crate::error::{HistoryError, RestoreItemError};
use crate::model::ShapeRecord;

/// Default number of snapshots kept
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Value copy of the durable part of a scene
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSnapshot {
    records: Vec<ShapeRecord>,
    zoom: f64,
    taken_at: DateTime<Utc>,
}

impl SceneSnapshot {
    /// Capture every durable object in `scene`, in paint order
    pub fn capture(scene: &Scene, zoom: f64) -> Self {
        Self::from_records(scene.durable_objects().map(ShapeRecord::from).collect(), zoom)
    }

    /// Build a snapshot from stored records
    pub fn from_records(records: Vec<ShapeRecord>, zoom: f64) -> Self {
        Self {
            records,
            zoom,
            taken_at: Utc::now(),
        }
    }

    pub fn records(&self) -> &[ShapeRecord] {
        &self.records
    }

    /// Zoom in effect when the snapshot was taken
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Bounded list of snapshots with a cursor on the one being displayed
#[derive(Debug, Clone)]
pub struct SceneHistory {
    snapshots: Vec<SceneSnapshot>,
    cursor: usize,
    max_depth: usize,
}

impl SceneHistory {
    /// Create a history with the default depth (50)
    pub fn new() -> Self {
        Self::with_depth(DEFAULT_HISTORY_DEPTH)
    }

    /// Create with a custom maximum depth (at least 1)
    pub fn with_depth(max_depth: usize) -> Self {
        let max_depth = max_depth.max(1);
        Self {
            snapshots: Vec::with_capacity(max_depth),
            cursor: 0,
            max_depth,
        }
    }

    /// Append a snapshot after the cursor, discarding the redo branch
    ///
    /// Returns the number of old snapshots evicted to stay within the depth.
    pub fn push(&mut self, snapshot: SceneSnapshot) -> usize {
        if !self.snapshots.is_empty() {
            self.snapshots.truncate(self.cursor + 1);
        }
        self.snapshots.push(snapshot);
        self.cursor = self.snapshots.len() - 1;

        let evicted = self.snapshots.len().saturating_sub(self.max_depth);
        if evicted > 0 {
            self.snapshots.drain(..evicted);
            self.cursor = self.cursor.saturating_sub(evicted);
        }
        evicted
    }

    /// Capture `scene` and push it
    pub fn record(&mut self, scene: &Scene, zoom: f64) -> usize {
        self.push(SceneSnapshot::capture(scene, zoom))
    }

    /// Step back and return the snapshot to restore
    pub fn undo(&mut self) -> Result<&SceneSnapshot, HistoryError> {
        if self.snapshots.is_empty() || self.cursor == 0 {
            return Err(HistoryError::NothingToUndo);
        }
        self.cursor -= 1;
        Ok(&self.snapshots[self.cursor])
    }

    /// Step forward and return the snapshot to restore
    pub fn redo(&mut self) -> Result<&SceneSnapshot, HistoryError> {
        if self.cursor + 1 >= self.snapshots.len() {
            return Err(HistoryError::NothingToRedo);
        }
        self.cursor += 1;
        Ok(&self.snapshots[self.cursor])
    }

    /// Snapshot under the cursor
    pub fn current(&self) -> Option<&SceneSnapshot> {
        self.snapshots.get(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Snapshots oldest first
    pub fn snapshots(&self) -> &[SceneSnapshot] {
        &self.snapshots
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }
}

impl Default for SceneHistory {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of rebuilding a scene from a snapshot
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreReport {
    /// Objects rebuilt
    pub restored: usize,
    /// Records that could not be rebuilt
    pub skipped: Vec<RestoreItemError>,
}

impl RestoreReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Replace the durable objects in `scene` with the contents of `snapshot`
///
/// Overlay objects are left untouched. Coordinates and stroke widths are
/// scaled by `current_zoom / snapshot zoom` so shapes keep their on-canvas
/// geometry across zoom changes. Unreadable records are skipped and logged.
pub fn restore(scene: &mut Scene, snapshot: &SceneSnapshot, current_zoom: f64) -> RestoreReport {
    let factor = if snapshot.zoom.is_finite() && snapshot.zoom > 0.0 && current_zoom.is_finite() {
        current_zoom / snapshot.zoom
    } else {
        tracing::warn!(
            "Cannot rescale snapshot (zoom {} -> {}), restoring unscaled",
            snapshot.zoom,
            current_zoom
        );
        1.0
    };

    scene.clear_durable();

    let mut report = RestoreReport::default();
    for record in &snapshot.records {
        match record.scaled(factor).to_object() {
            Ok(object) => {
                scene.insert(object);
                report.restored += 1;
            }
            Err(e) => {
                tracing::error!("Skipping unrestorable record: {}", e);
                report.skipped.push(e);
            }
        }
    }

    tracing::debug!(
        "Restored {} objects ({} skipped)",
        report.restored,
        report.skipped.len()
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Shape, StrokeStyle};

    fn snapshot(n: usize) -> SceneSnapshot {
        let mut scene = Scene::new();
        for i in 0..n {
            scene.add(
                Shape::Rectangle {
                    bounds: BoundingBox::new(0.0, 0.0, i as f64, i as f64),
                },
                StrokeStyle::default(),
            );
        }
        SceneSnapshot::capture(&scene, 1.0)
    }

    #[test]
    fn test_empty_history() {
        let mut history = SceneHistory::new();
        assert_eq!(history.undo().err(), Some(HistoryError::NothingToUndo));
        assert_eq!(history.redo().err(), Some(HistoryError::NothingToRedo));
        assert!(history.current().is_none());
    }

    #[test]
    fn test_push_discards_redo_branch() {
        let mut history = SceneHistory::new();
        history.push(snapshot(0));
        history.push(snapshot(1));
        history.push(snapshot(2));

        assert_eq!(history.undo().map(|s| s.len()), Ok(1));
        assert_eq!(history.undo().map(|s| s.len()), Ok(0));
        assert!(history.can_redo());

        history.push(snapshot(5));
        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
        assert!(!history.can_redo());
        assert_eq!(history.current().map(|s| s.len()), Some(5));
    }

    #[test]
    fn test_eviction_shifts_cursor() {
        let mut history = SceneHistory::with_depth(3);
        for i in 0..3 {
            assert_eq!(history.push(snapshot(i)), 0);
        }
        assert_eq!(history.push(snapshot(3)), 1);
        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), 2);
        assert_eq!(history.snapshots()[0].len(), 1);
    }

    #[test]
    fn test_overlays_not_captured() {
        let mut scene = Scene::new();
        scene.add(
            Shape::Oval {
                bounds: BoundingBox::new(0.0, 0.0, 4.0, 2.0),
            },
            StrokeStyle::default(),
        );
        scene.add_tagged(
            Shape::Oval {
                bounds: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            },
            StrokeStyle::default(),
            ["preview"],
        );
        let snap = SceneSnapshot::capture(&scene, 1.0);
        assert_eq!(snap.len(), 1);
        assert_eq!(snap.records()[0].kind, "oval");
    }

    #[test]
    fn test_restore_bad_snapshot_zoom_is_unscaled() {
        let snap = SceneSnapshot::from_records(snapshot(1).records().to_vec(), 0.0);
        let mut scene = Scene::new();
        let report = restore(&mut scene, &snap, 2.0);
        assert_eq!(report.restored, 1);
        assert_eq!(scene.objects()[0].stroke.width, 1.0);
    }
}
