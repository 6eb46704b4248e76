//! Per-item transforms: scale, rotation, and translation around a
//! normalized origin inside the item's own bounding box.
//!
//! For a geometry point `p` in an item with geometry bounds `B`:
//!
//! ```text
//! canvas(p) = O + R(rotate) · S(scale_x, scale_y) · (p − O) + translate
//! O         = B.origin + (origin_x · B.width, origin_y · B.height)
//! ```
//!
//! Displayed size is geometry size × scale. Because the pivot is part of
//! the composition, resizing can keep any anchor visually fixed by
//! solving for `translate` (see [`Transform::pinned`]).

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Transform {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Degrees, clockwise on screen (y grows downward).
    pub rotate: f64,
    pub translate_x: f64,
    pub translate_y: f64,
    /// Normalized pivot within the geometry bounds, 0..1.
    pub origin_x: f64,
    pub origin_y: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            rotate: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
            origin_x: 0.5,
            origin_y: 0.5,
        }
    }
}

impl Transform {
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.translate_x, self.translate_y)
    }

    /// The pivot point in geometry space.
    pub fn pivot(&self, bounds: Rect) -> Point {
        Point::new(
            bounds.x0 + self.origin_x * bounds.width(),
            bounds.y0 + self.origin_y * bounds.height(),
        )
    }

    /// The linear part: rotation after scale, no translation.
    pub fn linear(&self) -> Affine {
        Affine::rotate(self.rotate.to_radians()) * Affine::scale_non_uniform(self.scale_x, self.scale_y)
    }

    /// Geometry space → canvas space.
    pub fn to_affine(&self, bounds: Rect) -> Affine {
        let pivot = self.pivot(bounds).to_vec2();
        Affine::translate(pivot + self.translation()) * self.linear() * Affine::translate(-pivot)
    }

    pub fn apply(&self, bounds: Rect, p: Point) -> Point {
        self.to_affine(bounds) * p
    }

    /// Canvas space → geometry space. `None` when the transform is
    /// singular (a zero scale) or produces non-finite values.
    pub fn invert(&self, bounds: Rect, p: Point) -> Option<Point> {
        let affine = self.to_affine(bounds);
        let det = affine.determinant();
        if det.abs() < f64::EPSILON || !det.is_finite() {
            log::warn!("singular item transform: det={det}");
            return None;
        }
        let g = affine.inverse() * p;
        (g.x.is_finite() && g.y.is_finite()).then_some(g)
    }

    /// Displayed size of the geometry under this transform's scale.
    pub fn displayed_size(&self, bounds: Rect) -> Size {
        Size::new(
            bounds.width() * self.scale_x.abs(),
            bounds.height() * self.scale_y.abs(),
        )
    }

    /// A copy with translation chosen so geometry point `anchor` lands on
    /// canvas point `target`. Scale, rotation, and origin are untouched.
    pub fn pinned(&self, bounds: Rect, anchor: Point, target: Point) -> Transform {
        let pivot = self.pivot(bounds);
        let moved = pivot + (self.linear() * (anchor - pivot).to_point()).to_vec2();
        let t = target - moved;
        Transform {
            translate_x: t.x,
            translate_y: t.y,
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn close(a: Point, b: Point) -> bool {
        (a - b).hypot() < 1e-6
    }

    #[test]
    fn identity_maps_points_to_themselves() {
        let bounds = Rect::new(10.0, 20.0, 50.0, 60.0);
        let p = Point::new(13.0, 42.0);
        assert!(close(Transform::default().apply(bounds, p), p));
    }

    #[test]
    fn scale_pivots_around_origin() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 50.0);
        let t = Transform {
            scale_x: 2.0,
            scale_y: 2.0,
            origin_x: 0.0,
            origin_y: 0.0,
            ..Transform::default()
        };
        assert!(close(t.apply(bounds, Point::ZERO), Point::ZERO));
        assert!(close(t.apply(bounds, Point::new(100.0, 50.0)), Point::new(200.0, 100.0)));
    }

    #[test]
    fn rotation_is_clockwise_on_screen() {
        let bounds = Rect::new(-10.0, -10.0, 10.0, 10.0);
        let t = Transform {
            rotate: 90.0,
            ..Transform::default()
        };
        // "Up" (negative y) rotates to "right" (positive x).
        let p = t.apply(bounds, Point::new(0.0, -10.0));
        assert!(close(p, Point::new(10.0, 0.0)), "got {p:?}");
    }

    #[test]
    fn invert_roundtrips() {
        let bounds = Rect::new(5.0, 5.0, 45.0, 25.0);
        let t = Transform {
            scale_x: 1.5,
            scale_y: 0.5,
            rotate: 33.0,
            translate_x: 7.0,
            translate_y: -3.0,
            ..Transform::default()
        };
        let p = Point::new(12.0, 19.0);
        let back = t.invert(bounds, t.apply(bounds, p)).unwrap();
        assert!(close(back, p));
    }

    #[test]
    fn invert_rejects_zero_scale() {
        let t = Transform {
            scale_x: 0.0,
            ..Transform::default()
        };
        assert!(t.invert(Rect::new(0.0, 0.0, 10.0, 10.0), Point::ZERO).is_none());
    }

    #[test]
    fn pinned_keeps_anchor_on_target() {
        let bounds = Rect::new(0.0, 0.0, 40.0, 20.0);
        let t = Transform {
            scale_x: 2.5,
            scale_y: 0.75,
            rotate: 30.0,
            ..Transform::default()
        };
        let anchor = Point::new(40.0, 20.0);
        let target = Point::new(100.0, 100.0);
        let pinned = t.pinned(bounds, anchor, target);
        assert!(close(pinned.apply(bounds, anchor), target));
        assert!((pinned.scale_x - 2.5).abs() < EPS);
    }
}
