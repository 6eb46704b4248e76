//! Point and handle editing for a selected path.
//!
//! The pure functions here compute new point sequences; [`PathEditController`]
//! drives them from pointer gestures and writes each step to the document
//! as a single full-sequence update inside a transaction.

use crate::input::Modifiers;
use vecta_core::document::{DocumentModel, ItemPatch};
use vecta_core::kurbo::{Affine, Point, Vec2};
use vecta_core::model::{MIN_CLOSED_PATH_POINTS, MIN_OPEN_PATH_POINTS, PathPoint, ShapeKind};
use vecta_core::selection::SelectionState;
use vecta_core::transform::Transform;
use vecta_render::overlay::{PathPart, hit_test_path_parts, path_markers};

/// Which bezier handle of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleSide {
    In,
    Out,
}

/// Move the dragged point and every selected point by `delta`, handles
/// included.
pub fn move_points(points: &[PathPoint], selected: &[usize], dragged: usize, delta: Vec2) -> Vec<PathPoint> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let mut p = *p;
            if i == dragged || selected.contains(&i) {
                p.translate(delta);
            }
            p
        })
        .collect()
}

/// Put one handle of point `index` at `position`. Unless `break_symmetry`,
/// the opposite handle (when present) is mirrored through the anchor.
///
/// `None` when the index or the handle does not exist.
pub fn drag_handle(
    points: &[PathPoint],
    index: usize,
    side: HandleSide,
    position: Point,
    break_symmetry: bool,
) -> Option<Vec<PathPoint>> {
    let mut out = points.to_vec();
    let point = out.get_mut(index)?;
    let anchor = point.anchor();
    let (moved, opposite) = match side {
        HandleSide::In => (&mut point.handle_in, &mut point.handle_out),
        HandleSide::Out => (&mut point.handle_out, &mut point.handle_in),
    };
    moved.as_ref()?;
    *moved = Some(position);
    if !break_symmetry && let Some(other) = opposite {
        *other = anchor - (position - anchor);
    }
    Some(out)
}

/// Outcome of deleting the selected points.
#[derive(Debug, Clone, PartialEq)]
pub enum PointDeletion {
    /// Nothing selected.
    Unchanged,
    /// Too few points remain; the whole item goes.
    RemoveItem,
    Update { points: Vec<PathPoint>, closed: bool },
}

pub fn delete_points(points: &[PathPoint], selected: &[usize], closed: bool) -> PointDeletion {
    if !selected.iter().any(|i| *i < points.len()) {
        return PointDeletion::Unchanged;
    }
    let remaining: Vec<PathPoint> = points
        .iter()
        .enumerate()
        .filter(|(i, _)| !selected.contains(i))
        .map(|(_, p)| *p)
        .collect();
    if remaining.len() < MIN_OPEN_PATH_POINTS {
        return PointDeletion::RemoveItem;
    }
    let closed = closed && remaining.len() >= MIN_CLOSED_PATH_POINTS;
    PointDeletion::Update {
        points: remaining,
        closed,
    }
}

// ─── Controller ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
struct PathDrag {
    index: usize,
    part: PathPart,
    /// Geometry-space points at press.
    start_points: Vec<PathPoint>,
    closed: bool,
    /// Item transform and geometry → canvas mapping at press. Moving points
    /// shifts the bounds-relative pivot, so every step re-pins the
    /// transform to keep this mapping.
    start_transform: Option<Transform>,
    start_affine: Affine,
    additive: bool,
    moved: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PathEditController {
    drag: Option<PathDrag>,
}

impl PathEditController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Press at canvas point `at`. Returns whether a point or handle was hit;
    /// if so a drag begins and a transaction is opened.
    pub fn press<D: DocumentModel + ?Sized>(
        &mut self,
        doc: &mut D,
        selection: &mut SelectionState,
        at: Point,
        modifiers: Modifiers,
        radius: f64,
    ) -> bool {
        if !selection.edit_mode_active() {
            return false;
        }
        let Some(index) = selection.selected_index() else {
            return false;
        };
        let Some(canvas_points) = doc.get_transformed_path_points(index) else {
            return false;
        };
        let markers = path_markers(&canvas_points, selection.selected_point_indices());
        let Some(part) = hit_test_path_parts(&markers, at, radius) else {
            return false;
        };
        let Some(item) = doc.get_item_data(index) else {
            return false;
        };
        let start_affine = item.to_canvas();
        let det = start_affine.determinant();
        if det.abs() < f64::EPSILON || !det.is_finite() {
            log::warn!("path edit: item {index} has a singular transform");
            return false;
        }
        let ShapeKind::Path { points, closed } = item.kind else {
            return false;
        };

        if let PathPart::Anchor(i) = part {
            if modifiers.shift {
                selection.select_point(i, true);
            } else if !selection.is_point_selected(i) {
                selection.select_point(i, false);
            }
        }

        log::debug!("path edit: press {part:?} on item {index}");
        doc.begin_transaction();
        self.drag = Some(PathDrag {
            index,
            part,
            start_points: points,
            closed,
            start_transform: item.transform,
            start_affine,
            additive: modifiers.shift,
            moved: false,
        });
        true
    }

    /// Drag to canvas point `to`. Alt breaks handle symmetry.
    pub fn drag<D: DocumentModel + ?Sized>(
        &mut self,
        doc: &mut D,
        selection: &SelectionState,
        to: Point,
        modifiers: Modifiers,
    ) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        let geometry = drag.start_affine.inverse() * to;
        if !geometry.x.is_finite() || !geometry.y.is_finite() {
            return;
        }
        let next = match drag.part {
            PathPart::Anchor(i) => {
                let Some(origin) = drag.start_points.get(i) else {
                    return;
                };
                let delta = geometry - origin.anchor();
                Some(move_points(
                    &drag.start_points,
                    selection.selected_point_indices(),
                    i,
                    delta,
                ))
            }
            PathPart::HandleIn(i) => drag_handle(&drag.start_points, i, HandleSide::In, geometry, modifiers.alt),
            PathPart::HandleOut(i) => drag_handle(&drag.start_points, i, HandleSide::Out, geometry, modifiers.alt),
        };
        let Some(next) = next else {
            return;
        };
        drag.moved = true;
        let transform = drag.start_transform.and_then(|t| {
            let bounds = ShapeKind::Path {
                points: next.clone(),
                closed: drag.closed,
            }
            .geometry_bounds()?;
            Some(t.pinned(bounds, Point::ZERO, drag.start_affine * Point::ZERO))
        });
        let patch = ItemPatch {
            points: Some(next),
            transform,
            ..ItemPatch::default()
        };
        if let Err(err) = doc.update_item(drag.index, patch) {
            log::warn!("path edit: update failed: {err}");
        }
    }

    /// Release. A press on an anchor that never moved, without Shift,
    /// narrows the selection to that point.
    pub fn release<D: DocumentModel + ?Sized>(&mut self, doc: &mut D, selection: &mut SelectionState) {
        let Some(drag) = self.drag.take() else {
            return;
        };
        if let PathPart::Anchor(i) = drag.part
            && !drag.moved
            && !drag.additive
        {
            selection.select_point(i, false);
        }
        close_transaction(doc);
    }

    /// Abandon the drag, keeping whatever was already applied.
    pub fn cancel<D: DocumentModel + ?Sized>(&mut self, doc: &mut D) {
        if self.drag.take().is_some() {
            log::debug!("path edit: cancelled");
            close_transaction(doc);
        }
    }

    /// Delete the selected points of the path being edited. Returns whether
    /// the document changed.
    pub fn delete_selected_points<D: DocumentModel + ?Sized>(
        &mut self,
        doc: &mut D,
        selection: &mut SelectionState,
    ) -> bool {
        if !selection.edit_mode_active() {
            return false;
        }
        let Some(index) = selection.selected_index() else {
            return false;
        };
        let Some(ShapeKind::Path { points, closed }) = doc.get_item_data(index).map(|item| item.kind) else {
            return false;
        };
        match delete_points(&points, selection.selected_point_indices(), closed) {
            PointDeletion::Unchanged => false,
            PointDeletion::RemoveItem => {
                log::debug!("path edit: too few points left, removing item {index}");
                selection.exit_edit_mode();
                match doc.remove_item(index) {
                    Ok(_) => true,
                    Err(err) => {
                        log::warn!("path edit: remove failed: {err}");
                        false
                    }
                }
            }
            PointDeletion::Update { points, closed } => {
                selection.clear_point_selection();
                match doc.update_item(index, ItemPatch::path(points, closed)) {
                    Ok(()) => true,
                    Err(err) => {
                        log::warn!("path edit: delete failed: {err}");
                        false
                    }
                }
            }
        }
    }
}

fn close_transaction<D: DocumentModel + ?Sized>(doc: &mut D) {
    if let Err(err) = doc.end_transaction() {
        log::warn!("path edit: {err}");
    }
}
