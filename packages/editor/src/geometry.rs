//! Screen geometry for overlays and floating toolbars.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grow by `amount` on every side.
    pub fn inflate(self, amount: f64) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }

    pub fn top_left(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Scroll position, size and zoom of the preview.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// Percent, 100 = unscaled.
    pub zoom: u16,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            zoom: 100,
        }
    }
}

impl Viewport {
    pub fn scale(&self) -> f64 {
        f64::from(self.zoom) / 100.0
    }

    /// Map a page-space box (unscrolled, 100% zoom) to preview space.
    pub fn project(&self, rect: Rect) -> Rect {
        let scale = self.scale();
        Rect {
            x: (rect.x - self.scroll_x) * scale,
            y: (rect.y - self.scroll_y) * scale,
            width: rect.width * scale,
            height: rect.height * scale,
        }
    }

    /// Step the zoom, clamped to `[min, max]`. Returns true if it changed.
    pub fn step_zoom(&mut self, delta: i32, min: u16, max: u16) -> bool {
        let next = (i32::from(self.zoom) + delta).clamp(i32::from(min), i32::from(max)) as u16;
        let changed = next != self.zoom;
        self.zoom = next;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_applies_scroll_then_zoom() {
        let viewport = Viewport {
            scroll_y: 100.0,
            zoom: 50,
            ..Viewport::default()
        };
        let projected = viewport.project(Rect::new(20.0, 300.0, 200.0, 40.0));
        assert_eq!(projected, Rect::new(10.0, 100.0, 100.0, 20.0));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut viewport = Viewport::default();
        for _ in 0..20 {
            viewport.step_zoom(10, 50, 200);
        }
        assert_eq!(viewport.zoom, 200);
        assert!(!viewport.step_zoom(10, 50, 200));
        for _ in 0..20 {
            viewport.step_zoom(-10, 50, 200);
        }
        assert_eq!(viewport.zoom, 50);
    }
}
