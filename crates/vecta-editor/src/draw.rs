//! Two-point draw helper shared by the shape-creation tools.
//!
//! The gesture is click → move → click, not press-drag-release: the first
//! click fixes one corner, pointer movement previews the box, and the second
//! click finalizes it.

use vecta_core::kurbo::{Point, Rect};

/// Modifier-driven constraints on the previewed box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoxConstraint {
    /// Force width = height = max(width, height).
    pub square: bool,
    /// Treat the start point as the center rather than a corner.
    pub from_center: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TwoPointDraw {
    drawing: bool,
    start_x: f64,
    start_y: f64,
}

impl TwoPointDraw {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, x: f64, y: f64) {
        self.drawing = true;
        self.start_x = x;
        self.start_y = y;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn start_x(&self) -> f64 {
        self.start_x
    }

    pub fn start_y(&self) -> f64 {
        self.start_y
    }

    /// The box spanned by the start point and (`x`, `y`), normalized so its
    /// origin is the min corner. `None` while not drawing or for non-finite
    /// input.
    pub fn box_to(&self, x: f64, y: f64, constraint: BoxConstraint) -> Option<Rect> {
        if !self.drawing || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (sx, sy) = (self.start_x, self.start_y);
        let mut w = (x - sx).abs();
        let mut h = (y - sy).abs();
        if constraint.square {
            let side = w.max(h);
            w = side;
            h = side;
        }
        if constraint.from_center {
            return Some(Rect::from_center_size(Point::new(sx, sy), (w * 2.0, h * 2.0)));
        }
        let x0 = if x < sx { sx - w } else { sx };
        let y0 = if y < sy { sy - h } else { sy };
        Some(Rect::new(x0, y0, x0 + w, y0 + h))
    }
}
