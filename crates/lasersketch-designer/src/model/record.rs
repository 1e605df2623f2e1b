//! Flat stored form of a drawable object.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{ArcStyle, BoundingBox, DrawableObject, Point, Shape, ShapeKind, StrokeStyle};
use crate::error::RestoreItemError;

/// Value copy of a drawable object as kept in history and design files
///
/// Building a record from an object always succeeds. Going back is checked:
/// records come from disk as well as from memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeRecord {
    pub id: u64,
    pub kind: String,
    /// Flattened coordinate pairs `[x0, y0, x1, y1, ...]`
    pub coords: Vec<f64>,
    pub stroke_color: String,
    pub stroke_width: f64,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arc_style: Option<String>,
}

impl ShapeRecord {
    /// Same record with coordinates and stroke width multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            coords: self.coords.iter().map(|c| c * factor).collect(),
            stroke_width: self.stroke_width * factor,
            ..self.clone()
        }
    }

    /// Rebuild the drawable object this record describes
    pub fn to_object(&self) -> Result<DrawableObject, RestoreItemError> {
        let id = self.id;
        let kind = ShapeKind::parse(&self.kind).ok_or_else(|| RestoreItemError::UnknownKind {
            id,
            kind: self.kind.clone(),
        })?;

        if self.coords.iter().any(|c| !c.is_finite())
            || self.start.is_some_and(|a| !a.is_finite())
            || self.extent.is_some_and(|a| !a.is_finite())
        {
            return Err(RestoreItemError::NonFiniteValue { id });
        }
        if !self.stroke_width.is_finite() || self.stroke_width < 0.0 {
            return Err(RestoreItemError::InvalidStrokeWidth {
                id,
                width: self.stroke_width,
            });
        }

        let count_ok = match kind {
            ShapeKind::Polygon => self.coords.len() >= 6 && self.coords.len() % 2 == 0,
            _ => self.coords.len() == 4,
        };
        if !count_ok {
            return Err(RestoreItemError::BadCoordinates {
                id,
                kind: kind.to_string(),
                count: self.coords.len(),
            });
        }

        let c = &self.coords;
        let shape = match kind {
            ShapeKind::Line => Shape::Line {
                start: Point::new(c[0], c[1]),
                end: Point::new(c[2], c[3]),
            },
            ShapeKind::Oval => Shape::Oval {
                bounds: BoundingBox::new(c[0], c[1], c[2], c[3]),
            },
            ShapeKind::Rectangle => Shape::Rectangle {
                bounds: BoundingBox::new(c[0], c[1], c[2], c[3]),
            },
            ShapeKind::Polygon => Shape::Polygon {
                vertices: c.chunks_exact(2).map(|p| Point::new(p[0], p[1])).collect(),
            },
            ShapeKind::Arc => {
                let (start, extent) = match (self.start, self.extent) {
                    (Some(start), Some(extent)) => (start, extent),
                    _ => return Err(RestoreItemError::MissingArcAngles { id }),
                };
                let style = match &self.arc_style {
                    None => ArcStyle::Open,
                    Some(s) => ArcStyle::parse(s).ok_or_else(|| {
                        RestoreItemError::UnknownArcStyle {
                            id,
                            style: s.clone(),
                        }
                    })?,
                };
                Shape::Arc {
                    bounds: BoundingBox::new(c[0], c[1], c[2], c[3]),
                    start,
                    extent,
                    style,
                }
            }
        };

        Ok(DrawableObject {
            id,
            shape,
            stroke: StrokeStyle::new(self.stroke_color.clone(), self.stroke_width),
            tags: self.tags.clone(),
        })
    }
}

impl From<&DrawableObject> for ShapeRecord {
    fn from(obj: &DrawableObject) -> Self {
        let (start, extent, arc_style) = match &obj.shape {
            Shape::Arc {
                start,
                extent,
                style,
                ..
            } => (
                Some(*start),
                Some(*extent),
                Some(style.as_str().to_string()),
            ),
            _ => (None, None, None),
        };

        Self {
            id: obj.id,
            kind: obj.kind().as_str().to_string(),
            coords: obj.shape.points().iter().flat_map(|p| [p.x, p.y]).collect(),
            stroke_color: obj.stroke.color.clone(),
            stroke_width: obj.stroke.width,
            tags: obj.tags.clone(),
            start,
            extent,
            arc_style,
        }
    }
}

impl TryFrom<&ShapeRecord> for DrawableObject {
    type Error = RestoreItemError;

    fn try_from(record: &ShapeRecord) -> Result<Self, Self::Error> {
        record.to_object()
    }
}
