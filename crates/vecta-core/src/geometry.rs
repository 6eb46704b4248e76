//! Coordinate-space conversions and small angle/anchor helpers.
//!
//! Three spaces are in play:
//!
//! - **screen**: window pixels as delivered by the platform.
//! - **viewport**: screen minus the canvas widget's top-left corner.
//! - **canvas**: document units, independent of zoom and pan.
//!
//! `viewport = canvas · zoom + offset`.

use kurbo::{Point, Rect, Vec2};

/// Pan/zoom state mapping canvas space to viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub zoom: f64,
    pub offset: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            offset: Vec2::ZERO,
        }
    }
}

impl ViewTransform {
    pub fn canvas_to_viewport(&self, p: Point) -> Point {
        (p.to_vec2() * self.zoom + self.offset).to_point()
    }

    pub fn viewport_to_canvas(&self, p: Point) -> Point {
        if self.zoom.abs() < f64::EPSILON {
            return p;
        }
        ((p.to_vec2() - self.offset) / self.zoom).to_point()
    }

    /// Convert a viewport-space delta to canvas units (pan does not apply).
    pub fn viewport_delta_to_canvas(&self, delta: Vec2) -> Vec2 {
        if self.zoom.abs() < f64::EPSILON {
            return delta;
        }
        delta / self.zoom
    }
}

/// Screen → viewport: subtract the canvas widget's origin.
pub fn screen_to_viewport(p: Point, viewport_origin: Point) -> Point {
    (p - viewport_origin).to_point()
}

/// Rotate a vector clockwise on screen by `degrees`.
pub fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Express a canvas delta in the local axes of a shape rotated by
/// `rotation_degrees`.
pub fn to_local_delta(delta: Vec2, rotation_degrees: f64) -> Vec2 {
    rotate_vec(delta, -rotation_degrees)
}

/// Angle of `p` around `center`, in degrees: 0 points up, growing clockwise.
pub fn angle_from_up(center: Point, p: Point) -> f64 {
    let d = p - center;
    d.x.atan2(-d.y).to_degrees()
}

/// Round `degrees` to the nearest multiple of `step`.
pub fn snap_angle(degrees: f64, step: f64) -> f64 {
    if step <= 0.0 || !step.is_finite() {
        return degrees;
    }
    (degrees / step).round() * step
}

/// Point at normalized position (`fx`, `fy`) inside `bounds`.
pub fn anchor_point(bounds: Rect, fx: f64, fy: f64) -> Point {
    Point::new(
        bounds.x0 + fx * bounds.width(),
        bounds.y0 + fy * bounds.height(),
    )
}

pub fn is_finite_point(p: Point) -> bool {
    p.x.is_finite() && p.y.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn view_roundtrip() {
        let view = ViewTransform {
            zoom: 2.0,
            offset: Vec2::new(30.0, -10.0),
        };
        let p = Point::new(7.0, 11.0);
        let v = view.canvas_to_viewport(p);
        assert_eq!(v, Point::new(44.0, 12.0));
        assert_eq!(view.viewport_to_canvas(v), p);
    }

    #[test]
    fn screen_viewport_offset() {
        let origin = Point::new(100.0, 50.0);
        let v = screen_to_viewport(Point::new(110.0, 55.0), origin);
        assert_eq!(v, Point::new(10.0, 5.0));
    }

    #[test]
    fn angle_zero_is_up_and_clockwise() {
        let c = Point::ZERO;
        assert!(close(angle_from_up(c, Point::new(0.0, -1.0)), 0.0));
        assert!(close(angle_from_up(c, Point::new(1.0, 0.0)), 90.0));
        assert!(close(angle_from_up(c, Point::new(-1.0, 0.0)), -90.0));
    }

    #[test]
    fn local_delta_undoes_rotation() {
        let local = Vec2::new(10.0, 0.0);
        let canvas = rotate_vec(local, 90.0);
        assert!(close(canvas.x, 0.0) && close(canvas.y, 10.0));
        let back = to_local_delta(canvas, 90.0);
        assert!(close(back.x, 10.0) && close(back.y, 0.0));
    }

    #[test]
    fn snap_to_fifteen() {
        assert_eq!(snap_angle(22.0, 15.0), 15.0);
        assert_eq!(snap_angle(23.0, 15.0), 30.0);
        assert_eq!(snap_angle(-8.0, 15.0), -15.0);
        assert_eq!(snap_angle(8.0, 0.0), 8.0);
    }
}
