//! Drawable primitives and their stored form.
//!
//! A `DrawableObject` is what lives on the canvas; a `ShapeRecord` is the flat
//! value copy kept in history and written to design files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

mod record;

pub use record::ShapeRecord;

/// Tag carried by user-drawn shapes
pub const SHAPE_TAG: &str = "shape";

/// Tags marking overlay objects that are never stored in history
pub const EPHEMERAL_TAGS: [&str; 5] = ["grid", "snap", "preview", "drag", "marker"];

/// True if `tag` marks an overlay object
pub fn is_ephemeral_tag(tag: &str) -> bool {
    EPHEMERAL_TAGS.contains(&tag)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

/// Two opposite corners of an axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub start: Point,
    pub end: Point,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            start: Point::new(x1, y1),
            end: Point::new(x2, y2),
        }
    }

    pub fn width(&self) -> f64 {
        (self.end.x - self.start.x).abs()
    }

    pub fn height(&self) -> f64 {
        (self.end.y - self.start.y).abs()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            start: self.start.scaled(factor),
            end: self.end.scaled(factor),
        }
    }
}

/// Arc outline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcStyle {
    /// Just the curve
    #[default]
    Open,
    /// Curve closed by a straight chord
    Chord,
    /// Curve closed through the center
    PieSlice,
}

impl ArcStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArcStyle::Open => "open",
            ArcStyle::Chord => "chord",
            ArcStyle::PieSlice => "pieslice",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" | "arc" => Some(ArcStyle::Open),
            "chord" => Some(ArcStyle::Chord),
            "pieslice" | "pie" => Some(ArcStyle::PieSlice),
            _ => None,
        }
    }

    /// True for the outline styles that enclose an area
    pub fn is_closed(&self) -> bool {
        !matches!(self, ArcStyle::Open)
    }
}

/// Kind of a drawable primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Oval,
    Rectangle,
    Polygon,
    Arc,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Line => "line",
            ShapeKind::Oval => "oval",
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Arc => "arc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Some(ShapeKind::Line),
            "oval" | "ellipse" => Some(ShapeKind::Oval),
            "rectangle" | "rect" => Some(ShapeKind::Rectangle),
            "polygon" | "poly" => Some(ShapeKind::Polygon),
            "arc" => Some(ShapeKind::Arc),
            _ => None,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geometry of a drawable primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line {
        start: Point,
        end: Point,
    },
    Oval {
        bounds: BoundingBox,
    },
    Rectangle {
        bounds: BoundingBox,
    },
    Polygon {
        vertices: Vec<Point>,
    },
    /// Arc inscribed in `bounds`; angles in degrees, counter-clockwise from 3 o'clock
    Arc {
        bounds: BoundingBox,
        start: f64,
        extent: f64,
        style: ArcStyle,
    },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Line { .. } => ShapeKind::Line,
            Shape::Oval { .. } => ShapeKind::Oval,
            Shape::Rectangle { .. } => ShapeKind::Rectangle,
            Shape::Polygon { .. } => ShapeKind::Polygon,
            Shape::Arc { .. } => ShapeKind::Arc,
        }
    }

    /// Ordered coordinate pairs: endpoints, bounding corners or vertices
    pub fn points(&self) -> Vec<Point> {
        match self {
            Shape::Line { start, end } => vec![*start, *end],
            Shape::Oval { bounds } | Shape::Rectangle { bounds } | Shape::Arc { bounds, .. } => {
                vec![bounds.start, bounds.end]
            }
            Shape::Polygon { vertices } => vertices.clone(),
        }
    }

    /// Same shape with every coordinate multiplied by `factor`
    ///
    /// Arc angles are unaffected.
    pub fn scaled(&self, factor: f64) -> Self {
        match self {
            Shape::Line { start, end } => Shape::Line {
                start: start.scaled(factor),
                end: end.scaled(factor),
            },
            Shape::Oval { bounds } => Shape::Oval {
                bounds: bounds.scaled(factor),
            },
            Shape::Rectangle { bounds } => Shape::Rectangle {
                bounds: bounds.scaled(factor),
            },
            Shape::Polygon { vertices } => Shape::Polygon {
                vertices: vertices.iter().map(|p| p.scaled(factor)).collect(),
            },
            Shape::Arc {
                bounds,
                start,
                extent,
                style,
            } => Shape::Arc {
                bounds: bounds.scaled(factor),
                start: *start,
                extent: *extent,
                style: *style,
            },
        }
    }

    /// True for shapes drawn with a closed outline
    pub fn is_closed(&self) -> bool {
        match self {
            Shape::Line { .. } => false,
            Shape::Oval { .. } | Shape::Rectangle { .. } | Shape::Polygon { .. } => true,
            Shape::Arc { style, .. } => style.is_closed(),
        }
    }
}

/// Outline color and width
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: String,
    pub width: f64,
}

impl StrokeStyle {
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new("black", 1.0)
    }
}

/// A primitive on the canvas
#[derive(Debug, Clone, PartialEq)]
pub struct DrawableObject {
    pub id: u64,
    pub shape: Shape,
    pub stroke: StrokeStyle,
    pub tags: BTreeSet<String>,
}

impl DrawableObject {
    /// Create an object tagged as a user shape
    pub fn new(id: u64, shape: Shape, stroke: StrokeStyle) -> Self {
        Self {
            id,
            shape,
            stroke,
            tags: BTreeSet::from([SHAPE_TAG.to_string()]),
        }
    }

    /// Create an object with an explicit tag set
    pub fn with_tags<I, S>(id: u64, shape: Shape, stroke: StrokeStyle, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id,
            shape,
            stroke,
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// False if any tag marks the object as an overlay
    pub fn is_durable(&self) -> bool {
        !self.tags.iter().any(|t| is_ephemeral_tag(t))
    }

    /// Same object with geometry and stroke width multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            id: self.id,
            shape: self.shape.scaled(factor),
            stroke: StrokeStyle::new(self.stroke.color.clone(), self.stroke.width * factor),
            tags: self.tags.clone(),
        }
    }
}
