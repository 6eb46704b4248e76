//! Tool system for canvas interactions.
//!
//! Each tool turns canvas-space input events into [`ToolOutput`]s that the
//! session applies to the document, the viewport, and the selection.
//! Tools never touch the document themselves.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Select Tool | Rect Tool | Ellipse Tool | Text Tool |
//! |----------|-------------|-----------|--------------|-----------|
//! | **Shift** | Passed on with the click | Square constraint | Circle constraint | Square box; Shift+Enter inserts a newline |
//! | **Alt** | | Draw from center | | |

use crate::draw::{BoxConstraint, TwoPointDraw};
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::settings::CreationDefaults;
use std::collections::VecDeque;
use std::mem;
use vecta_core::config::EditorConfig;
use vecta_core::kurbo::{Point, Rect, Vec2};
use vecta_core::model::{ShapeItem, ShapeKind};

/// The active tool determines how input events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Select,
    Rectangle,
    Ellipse,
    Text,
}

/// What a tool can see when handling an event.
#[derive(Debug, Clone, Copy)]
pub struct ToolContext<'a> {
    /// Topmost item under the pointer.
    pub hit: Option<usize>,
    pub selected: Option<usize>,
    /// Pointer position in viewport space.
    pub screen: Point,
    pub zoom: f64,
    pub defaults: &'a CreationDefaults,
    pub config: &'a EditorConfig,
}

/// Requests a tool makes of the session.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutput {
    /// Live geometry for the gesture in progress.
    Preview(ShapeKind),
    PreviewCleared,
    /// A finished item with its style already snapshotted.
    ItemCompleted(Box<ShapeItem>),
    /// Camera pan in viewport units.
    Pan(Vec2),
    /// An object drag started; open a transaction.
    MoveStarted { index: usize },
    /// Incremental canvas-space move of the dragged item.
    MoveBy { index: usize, delta: Vec2 },
    /// The drag finished or was abandoned; close the transaction.
    MoveEnded,
    /// Press and release without a drag, at the press location.
    Clicked { at: Point, modifiers: Modifiers },
    /// The text box being edited changed.
    TextEditing(TextBox),
    TextEditingEnded,
}

/// Trait for tools that handle input and produce session requests.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle a canvas-space input event.
    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<ToolOutput>;

    /// Abandon any gesture in progress. The outputs close whatever the
    /// gesture had opened.
    fn reset(&mut self) -> Vec<ToolOutput>;

    /// Whether key events should reach this tool before shortcuts.
    fn captures_keys(&self) -> bool {
        false
    }
}

/// Both sides strictly greater than `min`.
fn exceeds(r: &Rect, min: f64) -> bool {
    r.width() > min && r.height() > min
}

fn rect_kind(r: Rect) -> ShapeKind {
    ShapeKind::Rectangle {
        x: r.x0,
        y: r.y0,
        width: r.width(),
        height: r.height(),
    }
}

fn ellipse_kind(r: Rect) -> ShapeKind {
    let radius_x = r.width() / 2.0;
    let radius_y = r.height() / 2.0;
    ShapeKind::Ellipse {
        cx: r.x0 + radius_x,
        cy: r.y0 + radius_y,
        radius_x,
        radius_y,
    }
}

// ─── Select Tool ─────────────────────────────────────────────────────────

/// Sliding-window average over clamped pan deltas.
#[derive(Debug, Clone)]
pub struct PanSmoother {
    samples: VecDeque<Vec2>,
    window: usize,
    limit: f64,
}

impl Default for PanSmoother {
    fn default() -> Self {
        let config = EditorConfig::default();
        Self::new(config.pan_smoothing_window, config.pan_delta_clamp)
    }
}

impl PanSmoother {
    pub fn new(window: usize, limit: f64) -> Self {
        let window = window.max(1);
        Self {
            samples: VecDeque::with_capacity(window),
            window,
            limit: if limit.is_finite() { limit.abs() } else { f64::MAX },
        }
    }

    /// Clamp `raw` per axis, add it to the window, and return the average.
    pub fn push(&mut self, raw: Vec2) -> Vec2 {
        let limit = self.limit;
        let clamp = |v: f64| if v.is_finite() { v.clamp(-limit, limit) } else { 0.0 };
        if self.samples.len() == self.window {
            self.samples.pop_front();
        }
        self.samples.push_back(Vec2::new(clamp(raw.x), clamp(raw.y)));
        let sum = self.samples.iter().fold(Vec2::ZERO, |acc, s| acc + *s);
        sum / self.samples.len() as f64
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum SelectGesture {
    Idle,
    Panning {
        last: Point,
    },
    /// Left button down, not yet a drag.
    Pressing {
        screen: Point,
        canvas: Point,
        /// Set when the press landed on the already-selected item.
        target: Option<usize>,
        exceeded: bool,
    },
    Moving {
        index: usize,
        last: Point,
    },
}

#[derive(Debug, Clone)]
pub struct SelectTool {
    gesture: SelectGesture,
    smoother: PanSmoother,
}

impl Default for SelectTool {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectTool {
    pub fn new() -> Self {
        Self {
            gesture: SelectGesture::Idle,
            smoother: PanSmoother::default(),
        }
    }

    /// Whether an object drag is in progress.
    pub fn is_moving(&self) -> bool {
        matches!(self.gesture, SelectGesture::Moving { .. })
    }

    pub fn is_panning(&self) -> bool {
        matches!(self.gesture, SelectGesture::Panning { .. })
    }

    fn pointer_move(&mut self, p: Point, ctx: &ToolContext) -> Vec<ToolOutput> {
        match self.gesture {
            SelectGesture::Panning { last } => {
                self.gesture = SelectGesture::Panning { last: ctx.screen };
                let delta = self.smoother.push(ctx.screen - last);
                log::trace!("pan {delta:?}");
                vec![ToolOutput::Pan(delta)]
            }
            SelectGesture::Pressing {
                screen,
                canvas,
                target,
                exceeded,
            } => {
                let moved = ctx.screen - screen;
                let threshold = ctx.config.drag_threshold;
                if exceeded || (moved.x.abs() <= threshold && moved.y.abs() <= threshold) {
                    return Vec::new();
                }
                match target {
                    Some(index) => {
                        log::debug!("select tool: drag item {index}");
                        self.gesture = SelectGesture::Moving { index, last: p };
                        vec![
                            ToolOutput::MoveStarted { index },
                            ToolOutput::MoveBy {
                                index,
                                delta: p - canvas,
                            },
                        ]
                    }
                    None => {
                        self.gesture = SelectGesture::Pressing {
                            screen,
                            canvas,
                            target,
                            exceeded: true,
                        };
                        Vec::new()
                    }
                }
            }
            SelectGesture::Moving { index, last } => {
                self.gesture = SelectGesture::Moving { index, last: p };
                vec![ToolOutput::MoveBy {
                    index,
                    delta: p - last,
                }]
            }
            SelectGesture::Idle => Vec::new(),
        }
    }

    fn pointer_up(&mut self, button: PointerButton, modifiers: Modifiers) -> Vec<ToolOutput> {
        match (self.gesture, button) {
            (SelectGesture::Panning { .. }, PointerButton::Middle) => {
                self.gesture = SelectGesture::Idle;
                self.smoother.clear();
                Vec::new()
            }
            (
                SelectGesture::Pressing {
                    canvas, exceeded, ..
                },
                PointerButton::Left,
            ) => {
                self.gesture = SelectGesture::Idle;
                if exceeded {
                    Vec::new()
                } else {
                    vec![ToolOutput::Clicked {
                        at: canvas,
                        modifiers,
                    }]
                }
            }
            (SelectGesture::Moving { .. }, PointerButton::Left) => {
                self.gesture = SelectGesture::Idle;
                vec![ToolOutput::MoveEnded]
            }
            _ => Vec::new(),
        }
    }
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<ToolOutput> {
        match event {
            InputEvent::PointerDown {
                button: PointerButton::Middle,
                ..
            } => {
                let out = self.reset();
                self.smoother = PanSmoother::new(
                    ctx.config.pan_smoothing_window,
                    ctx.config.pan_delta_clamp,
                );
                self.gesture = SelectGesture::Panning { last: ctx.screen };
                out
            }
            InputEvent::PointerDown {
                x,
                y,
                button: PointerButton::Left,
                ..
            } => {
                let out = self.reset();
                self.gesture = SelectGesture::Pressing {
                    screen: ctx.screen,
                    canvas: Point::new(*x, *y),
                    target: ctx.hit.filter(|hit| Some(*hit) == ctx.selected),
                    exceeded: false,
                };
                out
            }
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Point::new(*x, *y), ctx),
            InputEvent::PointerUp {
                button, modifiers, ..
            } => self.pointer_up(*button, *modifiers),
            InputEvent::Cancel => self.reset(),
            _ => Vec::new(),
        }
    }

    fn reset(&mut self) -> Vec<ToolOutput> {
        let out = if self.is_moving() {
            vec![ToolOutput::MoveEnded]
        } else {
            Vec::new()
        };
        self.gesture = SelectGesture::Idle;
        self.smoother.clear();
        out
    }
}

// ─── Rectangle / Ellipse Tools ───────────────────────────────────────────

/// Second click of a two-point gesture: the box if it is big enough.
/// Drawing state is reset either way.
fn finish_box(
    draw: &mut TwoPointDraw,
    p: Point,
    constraint: BoxConstraint,
    min_size: f64,
) -> Option<Rect> {
    let rect = draw.box_to(p.x, p.y, constraint);
    draw.reset();
    let rect = rect.filter(|r| exceeds(r, min_size));
    if rect.is_none() {
        log::debug!("discarded degenerate box at {p:?}");
    }
    rect
}

fn clear_preview(draw: &mut TwoPointDraw) -> Vec<ToolOutput> {
    let was_drawing = draw.is_drawing();
    draw.reset();
    if was_drawing {
        vec![ToolOutput::PreviewCleared]
    } else {
        Vec::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RectTool {
    draw: TwoPointDraw,
}

impl RectTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.draw.is_drawing()
    }

    fn constraint(modifiers: Modifiers) -> BoxConstraint {
        BoxConstraint {
            square: modifiers.shift,
            from_center: modifiers.alt,
        }
    }
}

impl Tool for RectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Rectangle
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<ToolOutput> {
        match event {
            InputEvent::Click {
                x,
                y,
                button: PointerButton::Left,
                modifiers,
            } => {
                if !self.draw.is_drawing() {
                    self.draw.begin(*x, *y);
                    return Vec::new();
                }
                let mut out = vec![ToolOutput::PreviewCleared];
                let constraint = Self::constraint(*modifiers);
                if let Some(r) = finish_box(
                    &mut self.draw,
                    Point::new(*x, *y),
                    constraint,
                    ctx.config.min_shape_size,
                ) {
                    log::debug!("rect tool: completed {r:?}");
                    out.push(ToolOutput::ItemCompleted(Box::new(
                        ctx.defaults.item(rect_kind(r)),
                    )));
                }
                out
            }
            InputEvent::PointerMove { x, y, modifiers } => self
                .draw
                .box_to(*x, *y, Self::constraint(*modifiers))
                .map(|r| vec![ToolOutput::Preview(rect_kind(r))])
                .unwrap_or_default(),
            InputEvent::Cancel => self.reset(),
            _ => Vec::new(),
        }
    }

    fn reset(&mut self) -> Vec<ToolOutput> {
        clear_preview(&mut self.draw)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EllipseTool {
    draw: TwoPointDraw,
}

impl EllipseTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        self.draw.is_drawing()
    }

    fn constraint(modifiers: Modifiers) -> BoxConstraint {
        BoxConstraint {
            square: modifiers.shift,
            from_center: false,
        }
    }
}

impl Tool for EllipseTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Ellipse
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<ToolOutput> {
        match event {
            InputEvent::Click {
                x,
                y,
                button: PointerButton::Left,
                modifiers,
            } => {
                if !self.draw.is_drawing() {
                    self.draw.begin(*x, *y);
                    return Vec::new();
                }
                let mut out = vec![ToolOutput::PreviewCleared];
                if let Some(r) = finish_box(
                    &mut self.draw,
                    Point::new(*x, *y),
                    Self::constraint(*modifiers),
                    ctx.config.min_shape_size,
                ) {
                    log::debug!("ellipse tool: completed {r:?}");
                    out.push(ToolOutput::ItemCompleted(Box::new(
                        ctx.defaults.item(ellipse_kind(r)),
                    )));
                }
                out
            }
            InputEvent::PointerMove { x, y, modifiers } => self
                .draw
                .box_to(*x, *y, Self::constraint(*modifiers))
                .map(|r| vec![ToolOutput::Preview(ellipse_kind(r))])
                .unwrap_or_default(),
            InputEvent::Cancel => self.reset(),
            _ => Vec::new(),
        }
    }

    fn reset(&mut self) -> Vec<ToolOutput> {
        clear_preview(&mut self.draw)
    }
}

// ─── Text Tool ───────────────────────────────────────────────────────────

/// Hint text shown in an empty box. Never committed as content.
pub const TEXT_PLACEHOLDER: &str = "Type something";

/// Fixed-advance caret estimate, as fractions of the font size.
const CHAR_ADVANCE: f64 = 0.6;
const LINE_HEIGHT: f64 = 1.2;

/// A text box being edited on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub bounds: Rect,
    pub content: String,
    /// Caret position in chars.
    pub caret: usize,
    pub font_family: String,
    pub font_size: f64,
}

impl TextBox {
    pub fn new(bounds: Rect, defaults: &CreationDefaults) -> Self {
        Self {
            bounds,
            content: String::new(),
            caret: 0,
            font_family: defaults.font_family.clone(),
            font_size: defaults.font_size,
        }
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.bounds.x0 && p.x <= self.bounds.x1 && p.y >= self.bounds.y0 && p.y <= self.bounds.y1
    }

    /// Bottom-right grip used to resize the box.
    pub fn resize_grip(&self) -> Point {
        Point::new(self.bounds.x1, self.bounds.y1)
    }

    /// Caret index nearest to `p`.
    pub fn caret_at(&self, p: Point) -> usize {
        let line_height = self.font_size * LINE_HEIGHT;
        let advance = self.font_size * CHAR_ADVANCE;
        let lines: Vec<usize> = self.content.split('\n').map(|l| l.chars().count()).collect();
        if !(line_height > 0.0 && advance > 0.0) {
            return self.content.chars().count();
        }
        let line = ((p.y - self.bounds.y0) / line_height).floor().max(0.0) as usize;
        let line = line.min(lines.len().saturating_sub(1));
        let column = ((p.x - self.bounds.x0) / advance).round().max(0.0) as usize;
        let offset: usize = lines[..line].iter().map(|len| len + 1).sum();
        offset + column.min(lines.get(line).copied().unwrap_or(0))
    }

    pub fn insert(&mut self, text: &str) {
        let at = self.byte_index(self.caret);
        self.content.insert_str(at, text);
        self.caret += text.chars().count();
    }

    /// Delete the char before the caret.
    pub fn backspace(&mut self) {
        if self.caret == 0 {
            return;
        }
        let start = self.byte_index(self.caret - 1);
        let end = self.byte_index(self.caret);
        self.content.replace_range(start..end, "");
        self.caret -= 1;
    }

    /// Non-empty and not the placeholder.
    pub fn is_committable(&self) -> bool {
        let trimmed = self.content.trim();
        !trimmed.is_empty() && trimmed != TEXT_PLACEHOLDER
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.content
            .char_indices()
            .nth(chars)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn into_kind(self) -> ShapeKind {
        ShapeKind::Text {
            x: self.bounds.x0,
            y: self.bounds.y0,
            width: self.bounds.width(),
            height: self.bounds.height(),
            content: self.content,
            font_family: self.font_family,
            font_size: self.font_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum TextState {
    Idle,
    Drawing,
    Editing(TextBox),
}

#[derive(Debug, Clone)]
pub struct TextTool {
    draw: TwoPointDraw,
    state: TextState,
    /// Grip drag in progress: press point and bounds at press.
    resizing: Option<(Point, Rect)>,
    /// One-shot: swallow the click that ends a grip drag.
    suppress_click: bool,
}

impl Default for TextTool {
    fn default() -> Self {
        Self::new()
    }
}

impl TextTool {
    pub fn new() -> Self {
        Self {
            draw: TwoPointDraw::new(),
            state: TextState::Idle,
            resizing: None,
            suppress_click: false,
        }
    }

    pub fn is_resizing(&self) -> bool {
        self.resizing.is_some()
    }

    pub fn is_drawing(&self) -> bool {
        self.state == TextState::Drawing
    }

    /// The box being edited, if any.
    pub fn editing(&self) -> Option<&TextBox> {
        match &self.state {
            TextState::Editing(text) => Some(text),
            _ => None,
        }
    }

    fn constraint(modifiers: Modifiers) -> BoxConstraint {
        BoxConstraint {
            square: modifiers.shift,
            from_center: false,
        }
    }

    fn preview_kind(bounds: Rect, defaults: &CreationDefaults) -> ShapeKind {
        TextBox::new(bounds, defaults).into_kind()
    }

    /// End editing: emit the item when it has real content, else drop it.
    fn commit(&mut self, ctx: &ToolContext) -> Vec<ToolOutput> {
        self.resizing = None;
        let TextState::Editing(text) = mem::replace(&mut self.state, TextState::Idle) else {
            return Vec::new();
        };
        let mut out = vec![ToolOutput::TextEditingEnded];
        if text.is_committable() {
            log::debug!("text tool: committed {} chars", text.content.chars().count());
            out.push(ToolOutput::ItemCompleted(Box::new(
                ctx.defaults.item(text.into_kind()),
            )));
        } else {
            log::debug!("text tool: discarded empty box");
        }
        out
    }

    fn click(&mut self, p: Point, modifiers: Modifiers, ctx: &ToolContext) -> Vec<ToolOutput> {
        if mem::take(&mut self.suppress_click) {
            return Vec::new();
        }
        if let TextState::Editing(text) = &mut self.state
            && text.contains(p)
        {
            text.caret = text.caret_at(p);
            return vec![ToolOutput::TextEditing(text.clone())];
        }

        match self.state {
            TextState::Idle => {
                self.draw.begin(p.x, p.y);
                self.state = TextState::Drawing;
                Vec::new()
            }
            TextState::Drawing => {
                let mut out = vec![ToolOutput::PreviewCleared];
                match finish_box(
                    &mut self.draw,
                    p,
                    Self::constraint(modifiers),
                    ctx.config.min_text_box_size,
                ) {
                    Some(bounds) => {
                        let text = TextBox::new(bounds, ctx.defaults);
                        out.push(ToolOutput::TextEditing(text.clone()));
                        self.state = TextState::Editing(text);
                    }
                    None => self.state = TextState::Idle,
                }
                out
            }
            TextState::Editing(_) => {
                // Outside click: close this box and start the next one here.
                let out = self.commit(ctx);
                self.draw.begin(p.x, p.y);
                self.state = TextState::Drawing;
                out
            }
        }
    }

    fn key(&mut self, key: &str, modifiers: Modifiers, ctx: &ToolContext) -> Vec<ToolOutput> {
        if key == "Escape" {
            return self.reset();
        }
        let TextState::Editing(text) = &mut self.state else {
            return Vec::new();
        };
        match key {
            "Enter" if modifiers.shift => text.insert("\n"),
            "Enter" => return self.commit(ctx),
            "Backspace" => text.backspace(),
            _ if key.chars().count() == 1 && !modifiers.command() => text.insert(key),
            _ => return Vec::new(),
        }
        vec![ToolOutput::TextEditing(text.clone())]
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn handle(&mut self, event: &InputEvent, ctx: &ToolContext) -> Vec<ToolOutput> {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button: PointerButton::Left,
                ..
            } => {
                self.suppress_click = false;
                let p = Point::new(*x, *y);
                let radius = ctx.config.handle_hit_radius / ctx.zoom.max(f64::EPSILON);
                if let TextState::Editing(text) = &self.state
                    && (text.resize_grip() - p).hypot() <= radius
                {
                    log::debug!("text tool: resize start");
                    self.resizing = Some((p, text.bounds));
                }
                Vec::new()
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                let p = Point::new(*x, *y);
                if let Some((start, initial)) = self.resizing
                    && let TextState::Editing(text) = &mut self.state
                {
                    let width = (initial.width() + p.x - start.x).max(ctx.config.text_box_min_width);
                    let height = (initial.height() + p.y - start.y).max(ctx.config.text_box_min_height);
                    text.bounds = Rect::new(initial.x0, initial.y0, initial.x0 + width, initial.y0 + height);
                    return vec![ToolOutput::TextEditing(text.clone())];
                }
                if self.state == TextState::Drawing {
                    return self
                        .draw
                        .box_to(p.x, p.y, Self::constraint(*modifiers))
                        .map(|r| vec![ToolOutput::Preview(Self::preview_kind(r, ctx.defaults))])
                        .unwrap_or_default();
                }
                Vec::new()
            }
            InputEvent::PointerUp {
                button: PointerButton::Left,
                ..
            } => {
                if self.resizing.take().is_some() {
                    self.suppress_click = true;
                }
                Vec::new()
            }
            InputEvent::Click {
                x,
                y,
                button: PointerButton::Left,
                modifiers,
            } => self.click(Point::new(*x, *y), *modifiers, ctx),
            InputEvent::Key { key, modifiers } => self.key(key, *modifiers, ctx),
            InputEvent::Cancel => self.reset(),
            _ => Vec::new(),
        }
    }

    fn reset(&mut self) -> Vec<ToolOutput> {
        let mut out = Vec::new();
        if self.draw.is_drawing() {
            out.push(ToolOutput::PreviewCleared);
        }
        if matches!(self.state, TextState::Editing(_)) {
            out.push(ToolOutput::TextEditingEnded);
        }
        self.draw.reset();
        self.state = TextState::Idle;
        self.resizing = None;
        self.suppress_click = false;
        out
    }

    fn captures_keys(&self) -> bool {
        matches!(self.state, TextState::Editing(_) | TextState::Drawing)
    }
}
