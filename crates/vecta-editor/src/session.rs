//! Editor session: the single entry point for host input.
//!
//! The session owns the document, the selection, the viewport, and the
//! tools. For each screen-space [`InputEvent`] it:
//!
//! 1. gives overlay gestures (resize/rotate grips, path points) first claim
//!    on a left press with the select tool active;
//! 2. otherwise maps the event to canvas space and hands it to the active
//!    tool, applying the tool's [`ToolOutput`]s;
//! 3. drains document events into the selection so its index and snapshot
//!    stay consistent;
//! 4. reports what changed as [`EditorEvent`]s.
//!
//! Every drag opens a document transaction on its first step and closes it
//! on release, cancel, tool switch, or Escape.

use crate::input::{ClickTracker, InputEvent, Modifiers, PointerButton};
use crate::path_edit::PathEditController;
use crate::settings::{SettingsStore, StyleChange};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{
    EllipseTool, RectTool, SelectTool, TextBox, TextTool, Tool, ToolContext, ToolKind, ToolOutput,
};
use crate::transform_overlay::TransformGesture;
use crate::viewport::ViewportController;
use smallvec::SmallVec;
use vecta_core::config::EditorConfig;
use vecta_core::document::{DocumentModel, ItemPatch};
use vecta_core::kurbo::{Point, Size};
use vecta_core::model::ShapeKind;
use vecta_core::selection::SelectionState;
use vecta_render::hit::hit_test_with_margin;
use vecta_render::overlay::{self, HandleLayout, PathMarker};

/// Notifications for the host, in the order the changes happened.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    ItemCreated { index: usize },
    /// The document was modified (any add, update, or removal).
    DocumentChanged,
    SelectionChanged { index: Option<usize> },
    EditModeChanged { active: bool },
    /// Live preview geometry appeared, changed, or went away.
    PreviewChanged,
    /// Zoom or pan changed.
    ViewChanged,
    ToolChanged(ToolKind),
    /// The text box being edited changed or closed.
    TextEditChanged,
}

pub struct EditorSession<D: DocumentModel> {
    doc: D,
    selection: SelectionState,
    viewport: ViewportController,
    settings: SettingsStore,
    config: EditorConfig,

    active_tool: ToolKind,
    select_tool: SelectTool,
    rect_tool: RectTool,
    ellipse_tool: EllipseTool,
    text_tool: TextTool,

    clicks: ClickTracker,
    transform: Option<TransformGesture>,
    path_edit: PathEditController,
    /// The current press went to an overlay gesture; its click is dropped.
    press_claimed: bool,

    preview: Option<ShapeKind>,
    text_box: Option<TextBox>,
}

impl<D: DocumentModel> EditorSession<D> {
    pub fn new(doc: D, config: EditorConfig, canvas_size: Size, viewport_size: Size) -> Self {
        let viewport = ViewportController::new(&config, canvas_size, viewport_size);
        Self {
            doc,
            selection: SelectionState::new(),
            viewport,
            settings: SettingsStore::new(),
            config,
            active_tool: ToolKind::Select,
            select_tool: SelectTool::new(),
            rect_tool: RectTool::new(),
            ellipse_tool: EllipseTool::new(),
            text_tool: TextTool::new(),
            clicks: ClickTracker::new(),
            transform: None,
            path_edit: PathEditController::new(),
            press_claimed: false,
            preview: None,
            text_box: None,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn doc(&self) -> &D {
        &self.doc
    }

    /// Direct document access for hosts that edit outside gestures. Events
    /// queued here reach the selection on the next session call.
    pub fn doc_mut(&mut self) -> &mut D {
        &mut self.doc
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut ViewportController {
        &mut self.viewport
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn active_tool(&self) -> ToolKind {
        self.active_tool
    }

    pub fn preview(&self) -> Option<&ShapeKind> {
        self.preview.as_ref()
    }

    pub fn text_box(&self) -> Option<&TextBox> {
        self.text_box.as_ref()
    }

    /// Whether a resize/rotate or path drag is in progress.
    pub fn is_gesture_active(&self) -> bool {
        self.transform.is_some() || self.path_edit.is_dragging() || self.select_tool.is_moving()
    }

    /// Resize/rotate grips for the selected item, in canvas space. Empty in
    /// path edit mode.
    pub fn selection_handles(&self) -> SmallVec<[HandleLayout; 9]> {
        match self.selection.selected_item() {
            Some(item) if !self.selection.edit_mode_active() && !item.locked => {
                overlay::selection_handles(item, self.viewport.zoom(), self.config.rotate_handle_offset)
            }
            _ => SmallVec::new(),
        }
    }

    /// Corners of the selected item's (possibly rotated) box, in canvas
    /// space.
    pub fn selection_outline(&self) -> Option<[Point; 4]> {
        self.selection.selected_item().and_then(overlay::selection_outline)
    }

    /// Anchor and handle markers for the path being edited, in canvas space.
    pub fn path_markers(&self) -> Vec<PathMarker> {
        if !self.selection.edit_mode_active() {
            return Vec::new();
        }
        self.selection
            .selected_index()
            .and_then(|i| self.doc.get_transformed_path_points(i))
            .map(|points| overlay::path_markers(&points, self.selection.selected_point_indices()))
            .unwrap_or_default()
    }

    /// Topmost item at a canvas point.
    pub fn hit_test(&self, at: Point) -> Option<usize> {
        hit_test_with_margin(
            self.doc.items(),
            at.x,
            at.y,
            |i| self.doc.item_bounds(i),
            self.config.path_hit_margin,
        )
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Handle one screen-space input event.
    pub fn handle(&mut self, event: InputEvent) -> Vec<EditorEvent> {
        self.run(|s, out| {
            let click = s.clicks.track(&event, s.config.drag_threshold);
            match &event {
                InputEvent::Key { key, modifiers } => s.key(&event, key, *modifiers, out),
                InputEvent::Cancel => {
                    s.cancel_gestures(out);
                }
                InputEvent::Wheel { x, y, delta, .. } => {
                    let at = s.viewport.screen_to_viewport(Point::new(*x, *y));
                    s.viewport.wheel(*delta, at);
                    out.push(EditorEvent::ViewChanged);
                }
                _ => s.pointer(&event, out),
            }
            if let Some(click) = click
                && !s.press_claimed
            {
                s.dispatch(&click, out);
            }
        })
    }

    pub fn set_tool(&mut self, kind: ToolKind) -> Vec<EditorEvent> {
        self.run(|s, out| s.switch_tool(kind, out))
    }

    /// Select an item from outside the canvas (e.g. the layer list).
    pub fn select(&mut self, index: Option<usize>) -> Vec<EditorEvent> {
        self.run(|s, out| {
            s.cancel_gestures(out);
            s.pump_events(out);
            s.selection.select_item(index, &s.doc);
        })
    }

    /// Enter or leave path edit mode for the selected path.
    pub fn toggle_edit_mode(&mut self) -> Vec<EditorEvent> {
        self.run(|s, out| {
            s.cancel_gestures(out);
            if s.selection.edit_mode_active() {
                s.selection.exit_edit_mode();
            } else {
                s.selection.enter_edit_mode();
            }
        })
    }

    /// Change one style attribute of the selection and the creation defaults.
    pub fn set_style(&mut self, change: StyleChange) -> Vec<EditorEvent> {
        self.run(|s, _| {
            if let Err(err) = s.settings.set(change, &s.selection, &mut s.doc) {
                log::warn!("style change failed: {err}");
            }
        })
    }

    /// Delete the selected points in edit mode, else the selected item.
    pub fn delete_selection(&mut self) -> Vec<EditorEvent> {
        self.run(|s, out| s.delete(out))
    }

    /// Abandon any gesture in progress.
    pub fn cancel(&mut self) -> Vec<EditorEvent> {
        self.run(|s, out| {
            s.cancel_gestures(out);
        })
    }

    // ─── Internals ───────────────────────────────────────────────────────

    /// Run `f`, then sync the selection with the document and report
    /// selection and edit-mode changes.
    fn run(&mut self, f: impl FnOnce(&mut Self, &mut Vec<EditorEvent>)) -> Vec<EditorEvent> {
        let before = (self.selection.selected_index(), self.selection.edit_mode_active());
        let mut out = Vec::new();
        f(self, &mut out);
        self.pump_events(&mut out);
        let after = (self.selection.selected_index(), self.selection.edit_mode_active());
        if after.0 != before.0 {
            out.push(EditorEvent::SelectionChanged { index: after.0 });
        }
        if after.1 != before.1 {
            out.push(EditorEvent::EditModeChanged { active: after.1 });
        }
        out
    }

    /// Feed queued document events to the selection.
    fn pump_events(&mut self, out: &mut Vec<EditorEvent>) {
        let events = self.doc.take_events();
        if events.is_empty() {
            return;
        }
        for event in &events {
            self.selection.apply_event(event);
        }
        if out.last() != Some(&EditorEvent::DocumentChanged) {
            out.push(EditorEvent::DocumentChanged);
        }
    }

    fn pointer(&mut self, event: &InputEvent, out: &mut Vec<EditorEvent>) {
        let Some(screen) = event.position() else {
            return;
        };
        let canvas = self.viewport.screen_to_canvas(screen);
        let modifiers = event.modifiers();

        match event {
            InputEvent::PointerDown {
                button: PointerButton::Left,
                ..
            } => {
                self.press_claimed =
                    self.active_tool == ToolKind::Select && self.begin_overlay_gesture(canvas, modifiers);
                if self.press_claimed {
                    return;
                }
            }
            InputEvent::PointerMove { .. } => {
                let step = self
                    .transform
                    .as_ref()
                    .map(|g| (g.index(), g.update(canvas, modifiers, &self.config)));
                if let Some((index, patch)) = step {
                    if let Some(patch) = patch {
                        self.update(index, patch);
                    }
                    return;
                }
                if self.path_edit.is_dragging() {
                    self.path_edit.drag(&mut self.doc, &self.selection, canvas, modifiers);
                    return;
                }
            }
            InputEvent::PointerUp {
                button: PointerButton::Left,
                ..
            } => {
                if self.transform.take().is_some() {
                    log::debug!("transform gesture: end");
                    self.close_transaction();
                    return;
                }
                if self.path_edit.is_dragging() {
                    self.path_edit.release(&mut self.doc, &mut self.selection);
                    return;
                }
            }
            _ => {}
        }
        self.dispatch(event, out);
    }

    /// Try the overlay grips (or path points in edit mode) under `canvas`.
    fn begin_overlay_gesture(&mut self, canvas: Point, modifiers: Modifiers) -> bool {
        let zoom = self.viewport.zoom().max(f64::EPSILON);
        let radius = self.config.handle_hit_radius / zoom;

        if self.selection.edit_mode_active() {
            if self
                .path_edit
                .press(&mut self.doc, &mut self.selection, canvas, modifiers, radius)
            {
                return true;
            }
            if !modifiers.shift {
                self.selection.clear_point_selection();
            }
            return false;
        }

        let Some(index) = self.selection.selected_index() else {
            return false;
        };
        let Some(item) = self.selection.selected_item() else {
            return false;
        };
        if item.locked {
            return false;
        }
        let handles = overlay::selection_handles(item, zoom, self.config.rotate_handle_offset);
        let Some(handle) = overlay::hit_test_handles(&handles, canvas, radius) else {
            return false;
        };
        let Some(gesture) = TransformGesture::begin(index, item, handle, canvas) else {
            return false;
        };
        self.doc.begin_transaction();
        self.transform = Some(gesture);
        true
    }

    /// Hand a screen-space event to the active tool.
    fn dispatch(&mut self, event: &InputEvent, out: &mut Vec<EditorEvent>) {
        let screen = event.position();
        let canvas_event = match screen {
            Some(p) => event.with_position(self.viewport.screen_to_canvas(p)),
            None => event.clone(),
        };
        let hit = match (self.active_tool, canvas_event.position()) {
            (ToolKind::Select, Some(p)) => self.hit_test(p),
            _ => None,
        };
        let ctx = ToolContext {
            hit,
            selected: self.selection.selected_index(),
            screen: screen.map_or(Point::ZERO, |p| self.viewport.screen_to_viewport(p)),
            zoom: self.viewport.zoom(),
            defaults: &self.settings.defaults,
            config: &self.config,
        };
        let outputs = match self.active_tool {
            ToolKind::Select => self.select_tool.handle(&canvas_event, &ctx),
            ToolKind::Rectangle => self.rect_tool.handle(&canvas_event, &ctx),
            ToolKind::Ellipse => self.ellipse_tool.handle(&canvas_event, &ctx),
            ToolKind::Text => self.text_tool.handle(&canvas_event, &ctx),
        };
        self.apply(outputs, out);
    }

    fn apply(&mut self, outputs: Vec<ToolOutput>, out: &mut Vec<EditorEvent>) {
        for output in outputs {
            match output {
                ToolOutput::Preview(kind) => {
                    self.preview = Some(kind);
                    out.push(EditorEvent::PreviewChanged);
                }
                ToolOutput::PreviewCleared => {
                    self.preview = None;
                    out.push(EditorEvent::PreviewChanged);
                }
                ToolOutput::ItemCompleted(item) => {
                    let index = self.doc.add_item(*item);
                    out.push(EditorEvent::ItemCreated { index });
                    self.pump_events(out);
                    self.selection.select_item(Some(index), &self.doc);
                }
                ToolOutput::Pan(delta) => {
                    self.viewport.pan_by(delta);
                    out.push(EditorEvent::ViewChanged);
                }
                ToolOutput::MoveStarted { index } => {
                    log::debug!("move item {index}: begin");
                    self.doc.begin_transaction();
                }
                ToolOutput::MoveBy { index, delta } => {
                    if let Some(item) = self.doc.get_item_data(index) {
                        let moved = item.translated(delta);
                        let patch = ItemPatch {
                            kind: Some(moved.kind),
                            transform: moved.transform,
                            ..ItemPatch::default()
                        };
                        self.update(index, patch);
                    }
                }
                ToolOutput::MoveEnded => {
                    log::debug!("move: end");
                    self.close_transaction();
                }
                ToolOutput::Clicked { at, .. } => {
                    self.pump_events(out);
                    let hit = self.hit_test(at);
                    self.selection.select_item(hit, &self.doc);
                }
                ToolOutput::TextEditing(text) => {
                    self.text_box = Some(text);
                    out.push(EditorEvent::TextEditChanged);
                }
                ToolOutput::TextEditingEnded => {
                    self.text_box = None;
                    out.push(EditorEvent::TextEditChanged);
                }
            }
        }
    }

    fn key(&mut self, event: &InputEvent, key: &str, modifiers: Modifiers, out: &mut Vec<EditorEvent>) {
        if self.active_tool == ToolKind::Text && self.text_tool.captures_keys() {
            self.dispatch(event, out);
            return;
        }
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return;
        };
        if let Some(kind) = action.tool() {
            self.switch_tool(kind, out);
            return;
        }
        match action {
            ShortcutAction::Delete => self.delete(out),
            ShortcutAction::Cancel => {
                if self.cancel_gestures(out) {
                    return;
                }
                if self.selection.edit_mode_active() {
                    self.selection.exit_edit_mode();
                } else {
                    self.selection.clear();
                }
            }
            ShortcutAction::ToggleEditMode => {
                self.cancel_gestures(out);
                if self.selection.edit_mode_active() {
                    self.selection.exit_edit_mode();
                } else {
                    self.selection.enter_edit_mode();
                }
            }
            ShortcutAction::ZoomIn => {
                self.viewport.zoom_in();
                out.push(EditorEvent::ViewChanged);
            }
            ShortcutAction::ZoomOut => {
                self.viewport.zoom_out();
                out.push(EditorEvent::ViewChanged);
            }
            ShortcutAction::ZoomReset => {
                self.viewport.reset_zoom();
                out.push(EditorEvent::ViewChanged);
            }
            ShortcutAction::ToolSelect
            | ShortcutAction::ToolRect
            | ShortcutAction::ToolEllipse
            | ShortcutAction::ToolText => {}
        }
    }

    fn switch_tool(&mut self, kind: ToolKind, out: &mut Vec<EditorEvent>) {
        if kind == self.active_tool {
            return;
        }
        self.cancel_gestures(out);
        log::debug!("tool: {:?} → {kind:?}", self.active_tool);
        self.active_tool = kind;
        out.push(EditorEvent::ToolChanged(kind));
    }

    fn delete(&mut self, out: &mut Vec<EditorEvent>) {
        self.cancel_gestures(out);
        if self.selection.edit_mode_active() {
            self.path_edit
                .delete_selected_points(&mut self.doc, &mut self.selection);
            return;
        }
        let Some(index) = self.selection.selected_index() else {
            return;
        };
        match self.doc.remove_item(index) {
            Ok(item) => log::debug!("deleted {} {}", item.type_name(), item.id),
            Err(err) => log::warn!("delete failed: {err}"),
        }
    }

    /// Abandon every gesture in progress, closing any transaction it
    /// opened. Returns whether anything was in progress.
    fn cancel_gestures(&mut self, out: &mut Vec<EditorEvent>) -> bool {
        let mut active = false;
        if self.transform.take().is_some() {
            log::debug!("transform gesture: cancelled");
            self.close_transaction();
            active = true;
        }
        if self.path_edit.is_dragging() {
            self.path_edit.cancel(&mut self.doc);
            active = true;
        }
        active |= self.select_tool.is_panning();

        let mut outputs = self.select_tool.reset();
        outputs.extend(self.rect_tool.reset());
        outputs.extend(self.ellipse_tool.reset());
        outputs.extend(self.text_tool.reset());
        active |= !outputs.is_empty();
        self.apply(outputs, out);

        if self.preview.take().is_some() {
            out.push(EditorEvent::PreviewChanged);
        }
        self.clicks.reset();
        self.press_claimed = false;
        active
    }

    fn update(&mut self, index: usize, patch: ItemPatch) {
        if let Err(err) = self.doc.update_item(index, patch) {
            log::warn!("update of item {index} failed: {err}");
        }
    }

    fn close_transaction(&mut self) {
        if let Err(err) = self.doc.end_transaction() {
            log::warn!("{err}");
        }
    }
}
