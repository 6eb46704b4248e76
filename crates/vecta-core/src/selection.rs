//! Selection state: the selected item, its cached snapshot, and (in path
//! edit mode) the selected point indices.
//!
//! The state is owned by the editor session and passed explicitly to the
//! controllers that read or mutate it. It keeps itself consistent with the
//! document by consuming [`DocumentEvent`]s:
//!
//! - the selected item is removed → selection clears;
//! - an item before it is removed → the index shifts down by one;
//! - the selected item is modified → the snapshot is refreshed.

use crate::document::{DocumentEvent, DocumentModel};
use crate::model::{ShapeItem, ShapeKind};
use smallvec::SmallVec;

#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    selected_index: Option<usize>,
    selected_item: Option<ShapeItem>,
    /// Sorted, unique. Only non-empty while edit mode is active.
    selected_points: SmallVec<[usize; 8]>,
    edit_mode: bool,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_index
    }

    /// Cached snapshot of the selected item.
    pub fn selected_item(&self) -> Option<&ShapeItem> {
        self.selected_item.as_ref()
    }

    pub fn selected_point_indices(&self) -> &[usize] {
        &self.selected_points
    }

    pub fn is_point_selected(&self, index: usize) -> bool {
        self.selected_points.binary_search(&index).is_ok()
    }

    pub fn edit_mode_active(&self) -> bool {
        self.edit_mode
    }

    /// Select the item at `index` and cache its data. `None`, or an index
    /// the document does not have, clears the selection.
    pub fn select_item<D: DocumentModel + ?Sized>(&mut self, index: Option<usize>, doc: &D) {
        let snapshot = index.and_then(|i| doc.get_item_data(i).map(|item| (i, item)));
        match snapshot {
            Some((i, item)) => {
                if self.selected_index != Some(i) {
                    self.exit_edit_mode();
                }
                log::debug!("select item {i} ({})", item.id);
                self.selected_index = Some(i);
                self.selected_item = Some(item);
            }
            None => self.clear(),
        }
    }

    pub fn clear(&mut self) {
        self.exit_edit_mode();
        self.selected_index = None;
        self.selected_item = None;
    }

    /// Enter path edit mode. Only a selected path can be edited; returns
    /// whether edit mode is now active.
    pub fn enter_edit_mode(&mut self) -> bool {
        let is_path = matches!(
            self.selected_item.as_ref().map(|i| &i.kind),
            Some(ShapeKind::Path { .. })
        );
        if is_path && !self.edit_mode {
            log::debug!("enter path edit mode");
            self.edit_mode = true;
        }
        self.edit_mode
    }

    pub fn exit_edit_mode(&mut self) {
        if self.edit_mode {
            log::debug!("exit path edit mode");
        }
        self.edit_mode = false;
        self.selected_points.clear();
    }

    /// Select a point. With `multi` the point is toggled in the current set;
    /// otherwise it replaces the set. Ignored outside edit mode.
    pub fn select_point(&mut self, index: usize, multi: bool) {
        if !self.edit_mode {
            return;
        }
        match self.selected_points.binary_search(&index) {
            Ok(pos) if multi => {
                self.selected_points.remove(pos);
            }
            Err(pos) if multi => self.selected_points.insert(pos, index),
            _ => {
                self.selected_points.clear();
                self.selected_points.push(index);
            }
        }
    }

    pub fn clear_point_selection(&mut self) {
        self.selected_points.clear();
    }

    /// Keep index and snapshot consistent with a document change.
    pub fn apply_event(&mut self, event: &DocumentEvent) {
        let Some(selected) = self.selected_index else {
            return;
        };
        match event {
            DocumentEvent::ItemModified { index, data } if *index == selected => {
                if let ShapeKind::Path { points, .. } = &data.kind {
                    let len = points.len();
                    self.selected_points.retain(|i| *i < len);
                } else {
                    self.exit_edit_mode();
                }
                self.selected_item = Some((**data).clone());
            }
            DocumentEvent::ItemRemoved { index } if *index == selected => self.clear(),
            DocumentEvent::ItemRemoved { index } if *index < selected => {
                self.selected_index = Some(selected - 1);
            }
            DocumentEvent::ItemsCleared => self.clear(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::model::PathPoint;

    fn rect() -> ShapeItem {
        ShapeItem::new(ShapeKind::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        })
    }

    fn path() -> ShapeItem {
        ShapeItem::new(ShapeKind::Path {
            points: vec![
                PathPoint::new(0.0, 0.0),
                PathPoint::new(10.0, 0.0),
                PathPoint::new(10.0, 10.0),
            ],
            closed: true,
        })
    }

    #[test]
    fn select_and_clear() {
        let doc = Document::from_items(vec![rect(), rect()]);
        let mut sel = SelectionState::new();
        sel.select_item(Some(1), &doc);
        assert_eq!(sel.selected_index(), Some(1));
        assert!(sel.selected_item().is_some());
        sel.select_item(None, &doc);
        assert_eq!(sel.selected_index(), None);
        sel.select_item(Some(9), &doc);
        assert_eq!(sel.selected_index(), None);
    }

    #[test]
    fn removal_before_selection_shifts_index() {
        let doc = Document::from_items(vec![rect(), rect(), rect()]);
        let mut sel = SelectionState::new();
        sel.select_item(Some(2), &doc);
        sel.apply_event(&DocumentEvent::ItemRemoved { index: 0 });
        assert_eq!(sel.selected_index(), Some(1));
        sel.apply_event(&DocumentEvent::ItemRemoved { index: 1 });
        assert_eq!(sel.selected_index(), None);
        assert!(sel.selected_item().is_none());
    }

    #[test]
    fn removal_after_selection_is_ignored() {
        let doc = Document::from_items(vec![rect(), rect()]);
        let mut sel = SelectionState::new();
        sel.select_item(Some(0), &doc);
        sel.apply_event(&DocumentEvent::ItemRemoved { index: 1 });
        assert_eq!(sel.selected_index(), Some(0));
    }

    #[test]
    fn clear_event_drops_selection() {
        let doc = Document::from_items(vec![rect()]);
        let mut sel = SelectionState::new();
        sel.select_item(Some(0), &doc);
        sel.apply_event(&DocumentEvent::ItemsCleared);
        assert_eq!(sel.selected_index(), None);
    }

    #[test]
    fn edit_mode_requires_path() {
        let doc = Document::from_items(vec![rect(), path()]);
        let mut sel = SelectionState::new();
        sel.select_item(Some(0), &doc);
        assert!(!sel.enter_edit_mode());
        sel.select_item(Some(1), &doc);
        assert!(sel.enter_edit_mode());
    }

    #[test]
    fn point_selection_shift_toggles() {
        let doc = Document::from_items(vec![path()]);
        let mut sel = SelectionState::new();
        sel.select_item(Some(0), &doc);
        sel.select_point(0, false);
        assert!(sel.selected_point_indices().is_empty(), "ignored outside edit mode");

        sel.enter_edit_mode();
        sel.select_point(2, false);
        sel.select_point(0, true);
        assert_eq!(sel.selected_point_indices(), &[0, 2]);
        sel.select_point(2, true);
        assert_eq!(sel.selected_point_indices(), &[0]);
        sel.select_point(1, false);
        assert_eq!(sel.selected_point_indices(), &[1]);
    }

    #[test]
    fn modified_snapshot_prunes_stale_points() {
        let doc = Document::from_items(vec![path()]);
        let mut sel = SelectionState::new();
        sel.select_item(Some(0), &doc);
        sel.enter_edit_mode();
        sel.select_point(0, true);
        sel.select_point(2, true);

        let mut shorter = path();
        shorter.kind = ShapeKind::Path {
            points: vec![PathPoint::new(0.0, 0.0), PathPoint::new(1.0, 1.0)],
            closed: false,
        };
        sel.apply_event(&DocumentEvent::ItemModified {
            index: 0,
            data: Box::new(shorter),
        });
        assert_eq!(sel.selected_point_indices(), &[0]);
        assert!(sel.edit_mode_active());
    }
}
