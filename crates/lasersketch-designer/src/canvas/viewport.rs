//! Canvas zoom.

use std::fmt;

/// Smallest accepted zoom factor
pub const MIN_ZOOM: f64 = 0.1;

/// Largest accepted zoom factor
pub const MAX_ZOOM: f64 = 50.0;

/// Source of the zoom factor currently applied to the canvas
pub trait ZoomProvider {
    fn zoom(&self) -> f64;
}

/// Canvas zoom state (1.0 = 100%).
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    zoom: f64,
}

impl Viewport {
    pub fn new() -> Self {
        Self { zoom: 1.0 }
    }

    /// Sets the zoom level; values outside `MIN_ZOOM..=MAX_ZOOM` are ignored.
    ///
    /// Returns true if the zoom changed.
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        if zoom.is_finite() && (MIN_ZOOM..=MAX_ZOOM).contains(&zoom) && zoom != self.zoom {
            self.zoom = zoom;
            true
        } else {
            false
        }
    }

    /// Zooms in by multiplying current zoom by 1.2.
    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom * 1.2)
    }

    /// Zooms out by dividing current zoom by 1.2.
    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom / 1.2)
    }

    pub fn reset_zoom(&mut self) -> bool {
        self.set_zoom(1.0)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoomProvider for Viewport {
    fn zoom(&self) -> f64 {
        self.zoom
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0}%", self.zoom * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_bounds() {
        let mut viewport = Viewport::new();
        assert!(viewport.set_zoom(2.0));
        assert!(!viewport.set_zoom(2.0));
        assert!(!viewport.set_zoom(0.0));
        assert!(!viewport.set_zoom(f64::INFINITY));
        assert!(!viewport.set_zoom(100.0));
        assert_eq!(viewport.zoom(), 2.0);
        assert_eq!(viewport.to_string(), "200%");
    }

    #[test]
    fn test_zoom_steps() {
        let mut viewport = Viewport::new();
        viewport.zoom_in();
        assert!((viewport.zoom() - 1.2).abs() < 1e-12);
        viewport.reset_zoom();
        viewport.zoom_out();
        assert!((viewport.zoom() - 1.0 / 1.2).abs() < 1e-12);
    }
}
