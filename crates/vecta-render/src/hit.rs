//! Hit testing: canvas point → item index.
//!
//! Walks the item list in reverse (last painted = topmost) and returns the
//! first match. Containers are never hit directly, so clicking a shape
//! inside a group selects the shape; groups are picked from the layer list.

use vecta_core::kurbo::{Point, Rect};
use vecta_core::model::{ShapeItem, ShapeKind};

/// Extra pick margin around path bounds, on top of half the stroke width.
pub const PATH_HIT_MARGIN: f64 = 2.0;

/// Find the topmost item at (`px`, `py`).
///
/// `bounds` supplies canvas-space bounds by item index; it is consulted for
/// text and path items only. Returns `None` on background.
pub fn hit_test<F>(items: &[ShapeItem], px: f64, py: f64, bounds: F) -> Option<usize>
where
    F: Fn(usize) -> Option<Rect>,
{
    hit_test_with_margin(items, px, py, bounds, PATH_HIT_MARGIN)
}

/// [`hit_test`] with a configurable path pick margin.
pub fn hit_test_with_margin<F>(
    items: &[ShapeItem],
    px: f64,
    py: f64,
    bounds: F,
    path_margin: f64,
) -> Option<usize>
where
    F: Fn(usize) -> Option<Rect>,
{
    let p = Point::new(px, py);
    items
        .iter()
        .enumerate()
        .rev()
        .find(|(index, item)| item_hit(item, *index, p, &bounds, path_margin))
        .map(|(index, _)| index)
}

fn item_hit<F>(item: &ShapeItem, index: usize, p: Point, bounds: &F, path_margin: f64) -> bool
where
    F: Fn(usize) -> Option<Rect>,
{
    if !item.visible || item.locked {
        return false;
    }

    match &item.kind {
        ShapeKind::Rectangle {
            x,
            y,
            width,
            height,
        } => local_point(item, p).is_some_and(|l| {
            l.x >= *x && l.x <= x + width && l.y >= *y && l.y <= y + height
        }),
        ShapeKind::Ellipse {
            cx,
            cy,
            radius_x,
            radius_y,
        } => {
            if *radius_x <= 0.0 || *radius_y <= 0.0 {
                return false;
            }
            local_point(item, p).is_some_and(|l| {
                let nx = (l.x - cx) / radius_x;
                let ny = (l.y - cy) / radius_y;
                nx * nx + ny * ny <= 1.0
            })
        }
        ShapeKind::Text { .. } => bounds(index).is_some_and(|b| contains_inclusive(b, p)),
        ShapeKind::Path { .. } => bounds(index).is_some_and(|b| {
            let pad = item.resolved_style().stroke_width / 2.0 + path_margin;
            contains_inclusive(b.inflate(pad, pad), p)
        }),
        ShapeKind::Group | ShapeKind::Layer | ShapeKind::Artboard { .. } => false,
    }
}

/// The point in the item's own geometry space.
fn local_point(item: &ShapeItem, p: Point) -> Option<Point> {
    match (item.transform, item.kind.geometry_bounds()) {
        (Some(transform), Some(bounds)) => transform.invert(bounds, p),
        _ => Some(p),
    }
}

fn contains_inclusive(b: Rect, p: Point) -> bool {
    p.x >= b.x0 && p.x <= b.x1 && p.y >= b.y0 && p.y <= b.y1
}
