//! The document model contract consumed by the interaction layer, plus an
//! in-memory implementation.
//!
//! The editor never reaches into item storage directly. Every edit goes
//! through [`DocumentModel::update_item`] with a partial [`ItemPatch`], and
//! drag gestures bracket their incremental updates with
//! `begin_transaction` / `end_transaction` so a whole drag is one
//! undoable step.
//!
//! Change notifications are queued as [`DocumentEvent`]s and drained by the
//! owner with `take_events`, preserving emission order.

use crate::error::DocumentError;
use crate::id::ItemId;
use crate::model::{Appearance, PathPoint, ShapeItem, ShapeKind, Style};
use crate::transform::Transform;
use kurbo::{Point, Rect};
use smallvec::SmallVec;
use std::mem;

/// Containers nested deeper than this are treated as a cycle.
const MAX_NESTING: usize = 64;

/// A partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPatch {
    /// Full geometry replacement. Must be the same variant as the target.
    pub kind: Option<ShapeKind>,
    /// New point sequence (paths only).
    pub points: Option<Vec<PathPoint>>,
    /// New `closed` flag (paths only).
    pub closed: Option<bool>,
    /// New string content (text only).
    pub content: Option<String>,
    pub transform: Option<Transform>,
    pub style: Option<Style>,
    /// Full replacement of the appearance stack.
    pub appearance: Option<SmallVec<[Appearance; 2]>>,
    pub visible: Option<bool>,
    pub locked: Option<bool>,
}

impl ItemPatch {
    pub fn geometry(kind: ShapeKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn path(points: Vec<PathPoint>, closed: bool) -> Self {
        Self {
            points: Some(points),
            closed: Some(closed),
            ..Self::default()
        }
    }

    pub fn transform(transform: Transform) -> Self {
        Self {
            transform: Some(transform),
            ..Self::default()
        }
    }

    pub fn style(style: Style) -> Self {
        Self {
            style: Some(style),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply to `item`, validating against its variant first. On error the
    /// item is left unchanged.
    pub fn apply_to(self, item: &mut ShapeItem) -> Result<(), DocumentError> {
        let kind = item.type_name();
        let mismatch = |reason| DocumentError::PatchMismatch { kind, reason };

        let mut next = item.clone();
        if let Some(geometry) = self.kind {
            if mem::discriminant(&geometry) != mem::discriminant(&next.kind) {
                return Err(mismatch("geometry variant differs"));
            }
            next.kind = geometry;
        }
        if self.points.is_some() || self.closed.is_some() {
            let ShapeKind::Path { points, closed } = &mut next.kind else {
                return Err(mismatch("only paths carry points"));
            };
            if let Some(new_points) = self.points {
                *points = new_points;
            }
            if let Some(new_closed) = self.closed {
                *closed = new_closed;
            }
        }
        if let Some(new_content) = self.content {
            let ShapeKind::Text { content, .. } = &mut next.kind else {
                return Err(mismatch("only text carries content"));
            };
            *content = new_content;
        }
        if let Some(transform) = self.transform {
            if matches!(next.kind, ShapeKind::Artboard { .. }) {
                return Err(mismatch("artboards have no transform"));
            }
            next.transform = Some(transform);
        }
        if let Some(style) = self.style {
            next.style = style;
        }
        if let Some(appearance) = self.appearance {
            next.appearance = appearance;
        }
        if let Some(visible) = self.visible {
            next.visible = visible;
        }
        if let Some(locked) = self.locked {
            next.locked = locked;
        }

        *item = next;
        Ok(())
    }
}

/// Change notifications emitted by the document model.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentEvent {
    ItemAdded { index: usize },
    ItemModified { index: usize, data: Box<ShapeItem> },
    ItemRemoved { index: usize },
    ItemsCleared,
}

/// Operations the interaction layer needs from a document.
///
/// Only the storage primitives are required; bounds and coordinate-space
/// queries have provided implementations in terms of [`items`](Self::items).
pub trait DocumentModel {
    /// All items in paint order (last = topmost).
    fn items(&self) -> &[ShapeItem];

    fn add_item(&mut self, item: ShapeItem) -> usize;

    fn update_item(&mut self, index: usize, patch: ItemPatch) -> Result<(), DocumentError>;

    fn remove_item(&mut self, index: usize) -> Result<ShapeItem, DocumentError>;

    fn begin_transaction(&mut self);

    fn end_transaction(&mut self) -> Result<(), DocumentError>;

    fn in_transaction(&self) -> bool;

    /// Drain queued change notifications in emission order.
    fn take_events(&mut self) -> Vec<DocumentEvent>;

    fn item_count(&self) -> usize {
        self.items().len()
    }

    /// Snapshot of the item at `index`.
    fn get_item_data(&self, index: usize) -> Option<ShapeItem> {
        self.items().get(index).cloned()
    }

    /// Canvas-space bounds of an item. Containers report the union of
    /// their children.
    fn item_bounds(&self, index: usize) -> Option<Rect> {
        let items = self.items();
        items.get(index).and_then(|item| item_bounds_in(items, item, 0))
    }

    /// Canvas-space bounds of everything owned by a layer (or group).
    /// An artboard reports its own absolute bounds.
    fn get_layer_bounds(&self, layer_id: ItemId) -> Option<Rect> {
        layer_bounds_in(self.items(), layer_id, 0)
    }

    /// A path's points mapped through its transform into canvas space.
    fn get_transformed_path_points(&self, index: usize) -> Option<Vec<PathPoint>> {
        let item = self.items().get(index)?;
        let ShapeKind::Path { points, .. } = &item.kind else {
            return None;
        };
        let affine = item.to_canvas();
        Some(points.iter().map(|p| p.transformed(affine)).collect())
    }

    /// Map a canvas point into the item's geometry space (inverse of its
    /// transform).
    fn transform_point_to_geometry(&self, index: usize, point: Point) -> Option<Point> {
        let item = self.items().get(index)?;
        match (item.kind.geometry_bounds(), item.transform) {
            (Some(bounds), Some(transform)) => transform.invert(bounds, point),
            _ => Some(point),
        }
    }
}

fn item_bounds_in(items: &[ShapeItem], item: &ShapeItem, depth: usize) -> Option<Rect> {
    match item.kind {
        ShapeKind::Group | ShapeKind::Layer => layer_bounds_in(items, item.id, depth + 1),
        _ => item.canvas_bounds(),
    }
}

fn layer_bounds_in(items: &[ShapeItem], layer_id: ItemId, depth: usize) -> Option<Rect> {
    if depth > MAX_NESTING {
        log::warn!("container nesting exceeds {MAX_NESTING} at {layer_id}; treating as cycle");
        return None;
    }
    if let Some(container) = items.iter().find(|i| i.id == layer_id)
        && matches!(container.kind, ShapeKind::Artboard { .. })
    {
        return container.kind.geometry_bounds();
    }
    items
        .iter()
        .filter(|i| i.parent == Some(layer_id))
        .filter_map(|i| item_bounds_in(items, i, depth))
        .reduce(|a, b| a.union(b))
}

// ─── In-memory document ──────────────────────────────────────────────────

/// A plain `Vec`-backed document.
///
/// Transactions nest; only the outermost `end_transaction` commits, and
/// a transaction that changed nothing commits nothing. Edits outside a
/// transaction each count as one step.
#[derive(Debug, Default)]
pub struct Document {
    items: Vec<ShapeItem>,
    events: Vec<DocumentEvent>,
    transaction_depth: usize,
    transaction_dirty: bool,
    committed_steps: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<ShapeItem>) -> Self {
        Self {
            items,
            ..Self::default()
        }
    }

    /// Remove everything. Emits `ItemsCleared`.
    pub fn clear(&mut self) {
        self.items.clear();
        self.events.push(DocumentEvent::ItemsCleared);
        self.record_change();
    }

    /// Number of undoable steps committed so far.
    pub fn committed_steps(&self) -> usize {
        self.committed_steps
    }

    fn record_change(&mut self) {
        if self.transaction_depth > 0 {
            self.transaction_dirty = true;
        } else {
            self.committed_steps += 1;
        }
    }

    fn check_index(&self, index: usize) -> Result<(), DocumentError> {
        if index < self.items.len() {
            Ok(())
        } else {
            Err(DocumentError::IndexOutOfRange {
                index,
                len: self.items.len(),
            })
        }
    }
}

impl DocumentModel for Document {
    fn items(&self) -> &[ShapeItem] {
        &self.items
    }

    fn add_item(&mut self, item: ShapeItem) -> usize {
        log::debug!("add {} {}", item.type_name(), item.id);
        self.items.push(item);
        let index = self.items.len() - 1;
        self.events.push(DocumentEvent::ItemAdded { index });
        self.record_change();
        index
    }

    fn update_item(&mut self, index: usize, patch: ItemPatch) -> Result<(), DocumentError> {
        self.check_index(index)?;
        if patch.is_empty() {
            return Ok(());
        }
        let item = &mut self.items[index];
        patch.apply_to(item)?;
        log::trace!("update item {index} ({})", item.id);
        self.events.push(DocumentEvent::ItemModified {
            index,
            data: Box::new(item.clone()),
        });
        self.record_change();
        Ok(())
    }

    fn remove_item(&mut self, index: usize) -> Result<ShapeItem, DocumentError> {
        self.check_index(index)?;
        let removed = self.items.remove(index);
        log::debug!("remove item {index} ({})", removed.id);
        self.events.push(DocumentEvent::ItemRemoved { index });
        self.record_change();
        Ok(removed)
    }

    fn begin_transaction(&mut self) {
        if self.transaction_depth == 0 {
            self.transaction_dirty = false;
        }
        self.transaction_depth += 1;
    }

    fn end_transaction(&mut self) -> Result<(), DocumentError> {
        if self.transaction_depth == 0 {
            return Err(DocumentError::UnbalancedTransaction);
        }
        self.transaction_depth -= 1;
        if self.transaction_depth == 0 {
            if self.transaction_dirty {
                self.committed_steps += 1;
            }
            self.transaction_dirty = false;
        }
        Ok(())
    }

    fn in_transaction(&self) -> bool {
        self.transaction_depth > 0
    }

    fn take_events(&mut self) -> Vec<DocumentEvent> {
        mem::take(&mut self.events)
    }
}
