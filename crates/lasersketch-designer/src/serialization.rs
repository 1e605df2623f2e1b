//! Serialization and deserialization for design files.
//!
//! A design file is pretty-printed JSON holding the durable objects of a
//! scene as `ShapeRecord`s together with the zoom they were saved at.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::canvas::Scene;
use crate::history::SceneSnapshot;
use crate::model::ShapeRecord;

/// Design file format version
const FILE_FORMAT_VERSION: &str = "1.0";

/// Complete design file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDocument {
    pub version: String,
    pub metadata: DocumentMetadata,
    pub zoom: f64,
    #[serde(default)]
    pub shapes: Vec<ShapeRecord>,
}

/// Design metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub name: String,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl SceneDocument {
    /// Create an empty document
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            version: FILE_FORMAT_VERSION.to_string(),
            metadata: DocumentMetadata {
                name: name.into(),
                created: now,
                modified: now,
            },
            zoom: 1.0,
            shapes: Vec::new(),
        }
    }

    /// Document holding the durable objects of `scene`
    pub fn from_scene(name: impl Into<String>, scene: &Scene, zoom: f64) -> Self {
        let mut doc = Self::new(name);
        doc.zoom = zoom;
        doc.shapes = scene.durable_objects().map(ShapeRecord::from).collect();
        doc
    }

    /// Snapshot suitable for restoring into a scene
    pub fn to_snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::from_records(self.shapes.clone(), self.zoom)
    }

    /// Save design to file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize design")?;

        std::fs::write(path.as_ref(), json).with_context(|| {
            format!("Failed to write design file {}", path.as_ref().display())
        })?;

        tracing::info!("Saved design to {}", path.as_ref().display());
        Ok(())
    }

    /// Load design from file
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read design file {}", path.as_ref().display())
        })?;

        let mut doc: SceneDocument =
            serde_json::from_str(&content).context("Failed to parse design file")?;

        if doc.version != FILE_FORMAT_VERSION {
            tracing::warn!(
                "Design file version {} differs from {}, loading anyway",
                doc.version,
                FILE_FORMAT_VERSION
            );
        }

        // Update modified timestamp
        doc.metadata.modified = Utc::now();

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BoundingBox, Shape, StrokeStyle};
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let mut scene = Scene::new();
        scene.add(
            Shape::Rectangle {
                bounds: BoundingBox::new(1.0, 2.0, 3.0, 4.0),
            },
            StrokeStyle::new("red", 2.0),
        );
        scene.add_tagged(
            Shape::Rectangle {
                bounds: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            },
            StrokeStyle::default(),
            ["grid"],
        );

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("design.json");
        SceneDocument::from_scene("Test", &scene, 1.5)
            .save_to_file(&path)
            .unwrap();

        let loaded = SceneDocument::load_from_file(&path).unwrap();
        assert_eq!(loaded.metadata.name, "Test");
        assert_eq!(loaded.zoom, 1.5);
        assert_eq!(loaded.shapes.len(), 1);
        assert_eq!(loaded.shapes[0].stroke_color, "red");
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = SceneDocument::load_from_file(dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read design file"));
    }

    #[test]
    fn test_load_invalid_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = SceneDocument::load_from_file(&path).unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse design file");
    }
}
