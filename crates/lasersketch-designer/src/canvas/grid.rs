//! Background grid drawn as tagged line objects.

use super::Scene;
use crate::model::{Point, Shape, StrokeStyle};

/// Tag carried by grid lines
pub const GRID_TAG: &str = "grid";

/// Smallest accepted grid spacing in unzoomed canvas units
pub const MIN_GRID_SPACING: f64 = 1.0;

/// Upper bound on lines drawn along each axis
pub const MAX_GRID_LINES: usize = 500;

const GRID_COLOR: &str = "#d0d0d0";

/// Grid settings and drawing
#[derive(Debug, Clone, PartialEq)]
pub struct GridOverlay {
    visible: bool,
    /// Line spacing in unzoomed canvas units
    spacing: f64,
    /// Size of the covered square in unzoomed canvas units
    extent: f64,
}

impl GridOverlay {
    pub fn new(spacing: f64, extent: f64) -> Self {
        Self {
            visible: false,
            spacing: if spacing.is_finite() && spacing >= MIN_GRID_SPACING {
                spacing
            } else {
                10.0
            },
            extent: extent.max(0.0),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    /// Sets the spacing; returns false and keeps the old one when `spacing`
    /// is below `MIN_GRID_SPACING` or not finite.
    pub fn set_spacing(&mut self, spacing: f64) -> bool {
        if !(spacing.is_finite() && spacing >= MIN_GRID_SPACING) {
            tracing::warn!("Ignoring grid spacing {}", spacing);
            return false;
        }
        self.spacing = spacing;
        true
    }

    /// Replace the grid lines in `scene` for the given zoom
    ///
    /// Old grid lines are always removed; new ones are drawn only when the
    /// grid is visible, and are lowered beneath every other object.
    pub fn redraw(&self, scene: &mut Scene, zoom: f64) -> usize {
        scene.remove_tagged(GRID_TAG);
        if !self.visible {
            return 0;
        }

        let mut step = self.spacing * zoom;
        let limit = self.extent * zoom;
        if !(step.is_finite() && step > 0.0 && limit.is_finite()) {
            return 0;
        }
        // Coarsen so a huge extent never floods the scene
        if limit / step >= MAX_GRID_LINES as f64 {
            step = limit / (MAX_GRID_LINES - 1) as f64;
        }

        let stroke = StrokeStyle::new(GRID_COLOR, 1.0);
        let mut count = 0;
        for i in 0..MAX_GRID_LINES {
            let offset = i as f64 * step;
            if offset > limit {
                break;
            }
            scene.add_tagged(
                Shape::Line {
                    start: Point::new(offset, 0.0),
                    end: Point::new(offset, limit),
                },
                stroke.clone(),
                [GRID_TAG],
            );
            scene.add_tagged(
                Shape::Line {
                    start: Point::new(0.0, offset),
                    end: Point::new(limit, offset),
                },
                stroke.clone(),
                [GRID_TAG],
            );
            count += 2;
        }

        scene.lower(GRID_TAG);
        count
    }
}

impl Default for GridOverlay {
    fn default() -> Self {
        Self::new(10.0, 400.0)
    }
}
