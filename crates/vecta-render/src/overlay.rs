//! Overlay geometry for the selection box and path editing.
//!
//! Computes where the eight resize grips, the rotation grip, and the path
//! anchor/handle markers sit in canvas space, and which of them lies under
//! the pointer. Painting them is the host's job; the same positions feed
//! both the painter and the hit tests so what is drawn is what is grabbed.

use smallvec::SmallVec;
use vecta_core::geometry::{anchor_point, rotate_vec};
use vecta_core::kurbo::{Point, Vec2};
use vecta_core::model::{PathPoint, ShapeItem, ShapeKind};

// ─── Selection handles ───────────────────────────────────────────────────

/// A grip on the selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    Rotate,
}

impl HandleKind {
    pub const RESIZE: [HandleKind; 8] = [
        HandleKind::TopLeft,
        HandleKind::Top,
        HandleKind::TopRight,
        HandleKind::Right,
        HandleKind::BottomRight,
        HandleKind::Bottom,
        HandleKind::BottomLeft,
        HandleKind::Left,
    ];

    /// Where the grip sits, as a normalized position in the item's bounds.
    pub fn position(self) -> (f64, f64) {
        match self {
            HandleKind::TopLeft => (0.0, 0.0),
            HandleKind::Top | HandleKind::Rotate => (0.5, 0.0),
            HandleKind::TopRight => (1.0, 0.0),
            HandleKind::Right => (1.0, 0.5),
            HandleKind::BottomRight => (1.0, 1.0),
            HandleKind::Bottom => (0.5, 1.0),
            HandleKind::BottomLeft => (0.0, 1.0),
            HandleKind::Left => (0.0, 0.5),
        }
    }

    /// The point that stays fixed while this grip is dragged: the opposite
    /// corner or edge. Edge grips keep the center on their free axis.
    pub fn anchor(self) -> (f64, f64) {
        match self {
            HandleKind::Rotate => (0.5, 0.5),
            other => {
                let (x, y) = other.position();
                (1.0 - x, 1.0 - y)
            }
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            HandleKind::TopLeft
                | HandleKind::TopRight
                | HandleKind::BottomRight
                | HandleKind::BottomLeft
        )
    }

    /// Direction a positive local x-delta grows the width: `1` for grips on
    /// the right edge, `-1` on the left, `0` when the grip leaves width alone.
    pub fn x_sign(self) -> f64 {
        match self.position().0 {
            x if x == 0.0 && self != HandleKind::Rotate => -1.0,
            x if x == 1.0 => 1.0,
            _ => 0.0,
        }
    }

    /// Like [`x_sign`](Self::x_sign) for height: `1` bottom, `-1` top.
    pub fn y_sign(self) -> f64 {
        if self == HandleKind::Rotate {
            return 0.0;
        }
        match self.position().1 {
            y if y == 0.0 => -1.0,
            y if y == 1.0 => 1.0,
            _ => 0.0,
        }
    }
}

/// A grip and its canvas position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleLayout {
    pub kind: HandleKind,
    pub position: Point,
}

/// Grips for the selected item, in canvas space.
///
/// `zoom` converts `rotate_offset` (screen units) to canvas units so the
/// rotation grip keeps a constant on-screen distance. Artboards get resize
/// grips only; groups and layers get none.
pub fn selection_handles(
    item: &ShapeItem,
    zoom: f64,
    rotate_offset: f64,
) -> SmallVec<[HandleLayout; 9]> {
    let mut out = SmallVec::new();
    if matches!(item.kind, ShapeKind::Group | ShapeKind::Layer) {
        return out;
    }
    let Some(bounds) = item.kind.geometry_bounds() else {
        return out;
    };
    let affine = item.to_canvas();

    for kind in HandleKind::RESIZE {
        let (fx, fy) = kind.position();
        out.push(HandleLayout {
            kind,
            position: affine * anchor_point(bounds, fx, fy),
        });
    }

    if !matches!(item.kind, ShapeKind::Artboard { .. }) {
        let rotation = item.transform.map_or(0.0, |t| t.rotate);
        let zoom = if zoom > 0.0 { zoom } else { 1.0 };
        let up = rotate_vec(Vec2::new(0.0, -1.0), rotation) * (rotate_offset / zoom);
        let top = affine * anchor_point(bounds, 0.5, 0.0);
        out.push(HandleLayout {
            kind: HandleKind::Rotate,
            position: top + up,
        });
    }
    out
}

/// The four corners of the selection box in canvas space (clockwise from
/// top-left). Rotated items give a rotated box.
pub fn selection_outline(item: &ShapeItem) -> Option<[Point; 4]> {
    let bounds = item.kind.geometry_bounds()?;
    let affine = item.to_canvas();
    Some([
        affine * Point::new(bounds.x0, bounds.y0),
        affine * Point::new(bounds.x1, bounds.y0),
        affine * Point::new(bounds.x1, bounds.y1),
        affine * Point::new(bounds.x0, bounds.y1),
    ])
}

/// The grip within `radius` (canvas units) of `p`, nearest first. The
/// rotation grip wins ties since it sits outside the box.
pub fn hit_test_handles(handles: &[HandleLayout], p: Point, radius: f64) -> Option<HandleKind> {
    handles
        .iter()
        .map(|h| (h, (h.position - p).hypot()))
        .filter(|(_, d)| *d <= radius)
        .min_by(|(a, da), (b, db)| {
            da.total_cmp(db)
                .then_with(|| (b.kind == HandleKind::Rotate).cmp(&(a.kind == HandleKind::Rotate)))
        })
        .map(|(h, _)| h.kind)
}

// ─── Path markers ────────────────────────────────────────────────────────

/// A draggable part of a path point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathPart {
    Anchor(usize),
    HandleIn(usize),
    HandleOut(usize),
}

impl PathPart {
    pub fn point_index(self) -> usize {
        match self {
            PathPart::Anchor(i) | PathPart::HandleIn(i) | PathPart::HandleOut(i) => i,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathMarker {
    pub part: PathPart,
    pub position: Point,
    /// Anchor: the point is selected. Handle: its point is selected.
    pub selected: bool,
    /// For handles, the anchor the handle line is drawn from.
    pub anchor: Point,
}

/// Markers for canvas-space path points. Every anchor gets a marker;
/// handles are shown for selected points only.
pub fn path_markers(points: &[PathPoint], selected: &[usize]) -> Vec<PathMarker> {
    let mut out = Vec::with_capacity(points.len());
    for (i, point) in points.iter().enumerate() {
        let is_selected = selected.contains(&i);
        let anchor = point.anchor();
        out.push(PathMarker {
            part: PathPart::Anchor(i),
            position: anchor,
            selected: is_selected,
            anchor,
        });
        if !is_selected {
            continue;
        }
        if let Some(h) = point.handle_in {
            out.push(PathMarker {
                part: PathPart::HandleIn(i),
                position: h,
                selected: true,
                anchor,
            });
        }
        if let Some(h) = point.handle_out {
            out.push(PathMarker {
                part: PathPart::HandleOut(i),
                position: h,
                selected: true,
                anchor,
            });
        }
    }
    out
}

/// The marker within `radius` of `p`. Handles are preferred over anchors
/// because a handle can sit on top of its own anchor.
pub fn hit_test_path_parts(markers: &[PathMarker], p: Point, radius: f64) -> Option<PathPart> {
    let nearest = |want_handles: bool| {
        markers
            .iter()
            .filter(|m| matches!(m.part, PathPart::Anchor(_)) != want_handles)
            .map(|m| (m.part, (m.position - p).hypot()))
            .filter(|(_, d)| *d <= radius)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(part, _)| part)
    };
    nearest(true).or_else(|| nearest(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecta_core::transform::Transform;

    fn rect_item() -> ShapeItem {
        ShapeItem::new(ShapeKind::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
        })
    }

    #[test]
    fn anchors_are_opposite() {
        assert_eq!(HandleKind::TopLeft.anchor(), (1.0, 1.0));
        assert_eq!(HandleKind::Right.anchor(), (0.0, 0.5));
        assert_eq!(HandleKind::Bottom.anchor(), (0.5, 0.0));
        assert_eq!(HandleKind::Rotate.anchor(), (0.5, 0.5));
    }

    #[test]
    fn edge_signs() {
        assert_eq!((HandleKind::Left.x_sign(), HandleKind::Left.y_sign()), (-1.0, 0.0));
        assert_eq!((HandleKind::Top.x_sign(), HandleKind::Top.y_sign()), (0.0, -1.0));
        assert_eq!(
            (HandleKind::BottomRight.x_sign(), HandleKind::BottomRight.y_sign()),
            (1.0, 1.0)
        );
        assert_eq!((HandleKind::Rotate.x_sign(), HandleKind::Rotate.y_sign()), (0.0, 0.0));
    }

    #[test]
    fn handles_sit_on_box() {
        let handles = selection_handles(&rect_item(), 1.0, 24.0);
        assert_eq!(handles.len(), 9);
        let br = handles.iter().find(|h| h.kind == HandleKind::BottomRight).unwrap();
        assert_eq!(br.position, Point::new(100.0, 50.0));
        let rot = handles.iter().find(|h| h.kind == HandleKind::Rotate).unwrap();
        assert_eq!(rot.position, Point::new(50.0, -24.0));
    }

    #[test]
    fn rotate_handle_offset_scales_with_zoom() {
        let handles = selection_handles(&rect_item(), 2.0, 24.0);
        let rot = handles.iter().find(|h| h.kind == HandleKind::Rotate).unwrap();
        assert_eq!(rot.position, Point::new(50.0, -12.0));
    }

    #[test]
    fn rotated_item_handles_follow_transform() {
        let item = rect_item().with_transform(Transform {
            rotate: 90.0,
            ..Transform::default()
        });
        let outline = selection_outline(&item).unwrap();
        // Center (50, 25) is the pivot; top-left (0,0) swings to (75, -25).
        assert!((outline[0] - Point::new(75.0, -25.0)).hypot() < 1e-9);
    }

    #[test]
    fn artboard_has_no_rotate_handle() {
        let item = ShapeItem::new(ShapeKind::Artboard {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        });
        let handles = selection_handles(&item, 1.0, 24.0);
        assert_eq!(handles.len(), 8);
        assert!(selection_handles(&ShapeItem::new(ShapeKind::Layer), 1.0, 24.0).is_empty());
    }

    #[test]
    fn handle_hit_picks_nearest() {
        let handles = selection_handles(&rect_item(), 1.0, 24.0);
        assert_eq!(
            hit_test_handles(&handles, Point::new(98.0, 49.0), 6.0),
            Some(HandleKind::BottomRight)
        );
        assert_eq!(
            hit_test_handles(&handles, Point::new(51.0, -22.0), 6.0),
            Some(HandleKind::Rotate)
        );
        assert_eq!(hit_test_handles(&handles, Point::new(30.0, 30.0), 6.0), None);
    }

    #[test]
    fn markers_show_handles_of_selected_points() {
        let points = [
            PathPoint::new(0.0, 0.0).with_handles(Some(Point::new(-10.0, 0.0)), Some(Point::new(10.0, 0.0))),
            PathPoint::new(50.0, 0.0).with_handles(Some(Point::new(40.0, 0.0)), None),
        ];
        let markers = path_markers(&points, &[0]);
        assert_eq!(markers.len(), 4);
        assert!(markers.iter().all(|m| m.part != PathPart::HandleIn(1)));
    }

    #[test]
    fn path_hit_prefers_handles() {
        let points = [PathPoint::new(0.0, 0.0).with_handles(None, Some(Point::new(3.0, 0.0)))];
        let markers = path_markers(&points, &[0]);
        assert_eq!(
            hit_test_path_parts(&markers, Point::new(1.0, 0.0), 5.0),
            Some(PathPart::HandleOut(0))
        );
        assert_eq!(
            hit_test_path_parts(&path_markers(&points, &[]), Point::new(1.0, 0.0), 5.0),
            Some(PathPart::Anchor(0))
        );
        assert_eq!(hit_test_path_parts(&markers, Point::new(20.0, 0.0), 5.0), None);
    }
}
