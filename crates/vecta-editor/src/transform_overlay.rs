//! Resize and rotate gestures on the selection box.
//!
//! A gesture captures the item's geometry and transform when the grip is
//! pressed, then turns each cursor position into one [`ItemPatch`] relative
//! to that snapshot. Working from the snapshot rather than the previous step
//! keeps the math free of accumulated rounding.
//!
//! Resizing keeps the grip's anchor (opposite corner or edge) fixed in
//! canvas space. Artboards have no transform, so their resize rewrites the
//! absolute bounds instead.

use crate::input::Modifiers;
use vecta_core::config::EditorConfig;
use vecta_core::document::ItemPatch;
use vecta_core::geometry::{anchor_point, angle_from_up, is_finite_point, snap_angle, to_local_delta};
use vecta_core::kurbo::{Point, Rect, Size};
use vecta_core::model::{ShapeItem, ShapeKind};
use vecta_core::transform::Transform;
use vecta_render::overlay::HandleKind;

/// Displayed sizes never shrink below this.
const MIN_DISPLAYED_SIZE: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TransformGesture {
    index: usize,
    handle: HandleKind,
    start_cursor: Point,
    geometry: Rect,
    start_transform: Transform,
    is_artboard: bool,
    /// Anchor in geometry space and where it sits on the canvas.
    anchor_geometry: Point,
    anchor_canvas: Point,
    /// Rotation pivot on the canvas and the cursor angle around it at press.
    center_canvas: Point,
    start_angle: f64,
}

impl TransformGesture {
    /// Start a gesture on `item` (at document `index`) from grip `handle`.
    ///
    /// `None` for items without geometry and for rotating an artboard.
    pub fn begin(index: usize, item: &ShapeItem, handle: HandleKind, cursor: Point) -> Option<Self> {
        if item.kind.is_container() && !matches!(item.kind, ShapeKind::Artboard { .. }) {
            return None;
        }
        let is_artboard = matches!(item.kind, ShapeKind::Artboard { .. });
        if is_artboard && handle == HandleKind::Rotate {
            return None;
        }
        let geometry = item.kind.geometry_bounds()?;
        if !is_finite_point(cursor) {
            return None;
        }
        let start_transform = item.transform_or_identity();
        let to_canvas = item.to_canvas();
        let (ax, ay) = handle.anchor();
        let anchor_geometry = anchor_point(geometry, ax, ay);
        let center_canvas = to_canvas * geometry.center();
        log::debug!("transform gesture: {handle:?} on item {index}");
        Some(Self {
            index,
            handle,
            start_cursor: cursor,
            geometry,
            start_transform,
            is_artboard,
            anchor_geometry,
            anchor_canvas: to_canvas * anchor_geometry,
            center_canvas,
            start_angle: angle_from_up(center_canvas, cursor),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn handle(&self) -> HandleKind {
        self.handle
    }

    /// Canvas position of the anchor captured at gesture start.
    pub fn anchor_canvas(&self) -> Point {
        self.anchor_canvas
    }

    /// The patch for the cursor at `cursor`. `None` for non-finite input.
    pub fn update(&self, cursor: Point, modifiers: Modifiers, config: &EditorConfig) -> Option<ItemPatch> {
        if !is_finite_point(cursor) {
            return None;
        }
        let patch = match (self.handle, self.is_artboard) {
            (HandleKind::Rotate, _) => ItemPatch::transform(self.rotate(cursor, modifiers, config)),
            (_, true) => ItemPatch::geometry(self.resize_artboard(cursor, modifiers)),
            (_, false) => ItemPatch::transform(self.resize(cursor, modifiers)),
        };
        Some(patch)
    }

    /// New displayed size after dragging the grip by the local-space delta.
    fn resized(&self, cursor: Point, rotation: f64, modifiers: Modifiers) -> (Size, Size) {
        let start = self.start_transform.displayed_size(self.geometry);
        let local = to_local_delta(cursor - self.start_cursor, rotation);
        // A mirrored axis puts the grip on the opposite side on screen.
        let x_sign = self.handle.x_sign() * self.start_transform.scale_x.signum();
        let y_sign = self.handle.y_sign() * self.start_transform.scale_y.signum();
        let mut width = (start.width + x_sign * local.x).max(MIN_DISPLAYED_SIZE);
        let mut height = (start.height + y_sign * local.y).max(MIN_DISPLAYED_SIZE);

        if modifiers.shift && self.handle.is_corner() && start.width > 0.0 && start.height > 0.0 {
            let rx = width / start.width;
            let ry = height / start.height;
            let ratio = if (rx - 1.0).abs() >= (ry - 1.0).abs() { rx } else { ry };
            width = (start.width * ratio).max(MIN_DISPLAYED_SIZE);
            height = (start.height * ratio).max(MIN_DISPLAYED_SIZE);
        }
        (start, Size::new(width, height))
    }

    fn resize(&self, cursor: Point, modifiers: Modifiers) -> Transform {
        let start = self.start_transform;
        let (_, size) = self.resized(cursor, start.rotate, modifiers);
        let scale_x = scale_for(size.width, self.geometry.width(), start.scale_x);
        let scale_y = scale_for(size.height, self.geometry.height(), start.scale_y);
        let scaled = Transform {
            scale_x,
            scale_y,
            ..start
        };
        let pinned = scaled.pinned(self.geometry, self.anchor_geometry, self.anchor_canvas);
        log::trace!("resize → scale ({scale_x:.3}, {scale_y:.3})");
        pinned
    }

    fn resize_artboard(&self, cursor: Point, modifiers: Modifiers) -> ShapeKind {
        let (start, size) = self.resized(cursor, 0.0, modifiers);
        let g = self.geometry;
        let x = match self.handle.x_sign() {
            s if s > 0.0 => g.x0,
            s if s < 0.0 => g.x1 - size.width,
            _ => g.x0,
        };
        let y = match self.handle.y_sign() {
            s if s > 0.0 => g.y0,
            s if s < 0.0 => g.y1 - size.height,
            _ => g.y0,
        };
        // Edge grips leave the other axis alone.
        let width = if self.handle.x_sign() == 0.0 { start.width } else { size.width };
        let height = if self.handle.y_sign() == 0.0 { start.height } else { size.height };
        ShapeKind::Artboard {
            x,
            y,
            width,
            height,
        }
    }

    fn rotate(&self, cursor: Point, modifiers: Modifiers, config: &EditorConfig) -> Transform {
        let current = angle_from_up(self.center_canvas, cursor);
        let mut rotate = self.start_transform.rotate + (current - self.start_angle);
        if modifiers.shift {
            rotate = snap_angle(rotate, config.rotation_snap_degrees);
        }
        let rotate = rotate.rem_euclid(360.0);
        let rotated = Transform {
            rotate,
            ..self.start_transform
        };
        rotated.pinned(self.geometry, self.geometry.center(), self.center_canvas)
    }
}

/// Scale mapping `geometry` units to `displayed` units, keeping the sign of
/// `current`. Zero geometry keeps the current scale.
fn scale_for(displayed: f64, geometry: f64, current: f64) -> f64 {
    if geometry.abs() < f64::EPSILON || !geometry.is_finite() {
        log::warn!("degenerate geometry size {geometry}; keeping scale {current}");
        return current;
    }
    let scale = displayed / geometry;
    if current < 0.0 { -scale } else { scale }
}
