//! Shape data model for Vecta documents.
//!
//! A document is an ordered list of `ShapeItem`s; list order is paint order
//! (last item is topmost). Geometry lives in `ShapeKind`, a tagged sum type
//! with one variant per shape. Groups, layers, and artboards are containers:
//! children point at them through a weak `parent` ID, never the other way
//! around.

use crate::id::ItemId;
use crate::transform::Transform;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Colors ──────────────────────────────────────────────────────────────

/// Fallback stroke/fill color used whenever a color is absent or unparsable.
pub const DEFAULT_COLOR: &str = "#FFFFFF";
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;
pub const DEFAULT_OPACITY: f64 = 1.0;
pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_FONT_SIZE: f64 = 16.0;

/// RGBA color. Stored as 4 × f32 [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RGB`, `#RRGGBB`, or `#RRGGBBAA`. The `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();
        let byte = |i: usize| -> Option<u8> { Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?) };

        match bytes.len() {
            3 => {
                let r = hex_val(bytes[0])?;
                let g = hex_val(bytes[1])?;
                let b = hex_val(bytes[2])?;
                Some(Self::rgba(
                    (r * 17) as f32 / 255.0,
                    (g * 17) as f32 / 255.0,
                    (b * 17) as f32 / 255.0,
                    1.0,
                ))
            }
            6 => Some(Self::rgba(
                byte(0)? as f32 / 255.0,
                byte(2)? as f32 / 255.0,
                byte(4)? as f32 / 255.0,
                1.0,
            )),
            8 => Some(Self::rgba(
                byte(0)? as f32 / 255.0,
                byte(2)? as f32 / 255.0,
                byte(4)? as f32 / 255.0,
                byte(6)? as f32 / 255.0,
            )),
            _ => None,
        }
    }
}

/// Return `color` if it parses, otherwise the default color.
fn resolve_color(color: &str) -> String {
    if Color::from_hex(color).is_some() {
        color.to_string()
    } else {
        DEFAULT_COLOR.to_string()
    }
}

fn resolve_opacity(opacity: f64) -> f64 {
    if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        DEFAULT_OPACITY
    }
}

// ─── Style ───────────────────────────────────────────────────────────────

/// Flat stroke/fill attributes carried by every drawable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Style {
    pub stroke_width: f64,
    pub stroke_color: String,
    pub stroke_opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            stroke_color: DEFAULT_COLOR.to_string(),
            stroke_opacity: DEFAULT_OPACITY,
            fill_color: DEFAULT_COLOR.to_string(),
            fill_opacity: DEFAULT_OPACITY,
        }
    }
}

impl Style {
    /// Replace anything invalid (unparsable color, negative or non-finite
    /// width, out-of-range opacity) with its default.
    pub fn normalized(&self) -> Style {
        Style {
            stroke_width: if self.stroke_width.is_finite() && self.stroke_width >= 0.0 {
                self.stroke_width
            } else {
                DEFAULT_STROKE_WIDTH
            },
            stroke_color: resolve_color(&self.stroke_color),
            stroke_opacity: resolve_opacity(self.stroke_opacity),
            fill_color: resolve_color(&self.fill_color),
            fill_opacity: resolve_opacity(self.fill_opacity),
        }
    }

    /// Collapse an appearance list into flat fields. The first `fill` and
    /// the first `stroke` entry win; later duplicates are ignored.
    pub fn from_appearance(entries: &[Appearance]) -> Style {
        let mut style = Style::default();
        let fill = entries.iter().find(|e| e.kind == AppearanceKind::Fill);
        let stroke = entries.iter().find(|e| e.kind == AppearanceKind::Stroke);

        if let Some(fill) = fill {
            if let Some(color) = &fill.color {
                style.fill_color = color.clone();
            }
            if let Some(opacity) = fill.opacity {
                style.fill_opacity = opacity;
            }
        }
        if let Some(stroke) = stroke {
            if let Some(color) = &stroke.color {
                style.stroke_color = color.clone();
            }
            if let Some(opacity) = stroke.opacity {
                style.stroke_opacity = opacity;
            }
            if let Some(width) = stroke.width {
                style.stroke_width = width;
            }
        }
        style.normalized()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppearanceKind {
    Fill,
    Stroke,
}

/// One entry of an ordered appearance stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    #[serde(rename = "type")]
    pub kind: AppearanceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
}

// ─── Path data ───────────────────────────────────────────────────────────

/// An anchor on a path plus its optional bezier control points.
///
/// Handles are stored in the same (geometry) space as the anchor, not as
/// offsets from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_in: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle_out: Option<Point>,
}

impl PathPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            handle_in: None,
            handle_out: None,
        }
    }

    pub fn with_handles(mut self, handle_in: Option<Point>, handle_out: Option<Point>) -> Self {
        self.handle_in = handle_in;
        self.handle_out = handle_out;
        self
    }

    pub fn anchor(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Move the anchor and both handles rigidly.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
        if let Some(h) = self.handle_in.as_mut() {
            *h += delta;
        }
        if let Some(h) = self.handle_out.as_mut() {
            *h += delta;
        }
    }

    /// Map the anchor and handles through an affine transform.
    pub fn transformed(&self, affine: Affine) -> PathPoint {
        let anchor = affine * self.anchor();
        PathPoint {
            x: anchor.x,
            y: anchor.y,
            handle_in: self.handle_in.map(|h| affine * h),
            handle_out: self.handle_out.map(|h| affine * h),
        }
    }
}

/// Minimum points for an open path to exist.
pub const MIN_OPEN_PATH_POINTS: usize = 2;
/// Minimum points for a path to stay closed.
pub const MIN_CLOSED_PATH_POINTS: usize = 3;

// ─── Shape kinds ─────────────────────────────────────────────────────────

/// Per-variant geometry. Serialized with a `type` tag so a completed item
/// reads as `{"type":"rectangle","x":..,"y":..,"width":..,"height":..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ShapeKind {
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Ellipse {
        #[serde(rename = "x")]
        cx: f64,
        #[serde(rename = "y")]
        cy: f64,
        radius_x: f64,
        radius_y: f64,
    },
    Text {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        content: String,
        font_family: String,
        font_size: f64,
    },
    Path {
        points: Vec<PathPoint>,
        closed: bool,
    },
    Group,
    Layer,
    Artboard {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

impl ShapeKind {
    /// The lowercase variant name, as used in the serialized `type` tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle { .. } => "rectangle",
            ShapeKind::Ellipse { .. } => "ellipse",
            ShapeKind::Text { .. } => "text",
            ShapeKind::Path { .. } => "path",
            ShapeKind::Group => "group",
            ShapeKind::Layer => "layer",
            ShapeKind::Artboard { .. } => "artboard",
        }
    }

    /// Groups, layers, and artboards only organize other items.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ShapeKind::Group | ShapeKind::Layer | ShapeKind::Artboard { .. }
        )
    }

    /// Bounding box of the raw geometry, before any item transform.
    /// Containers without own geometry and empty paths have none.
    pub fn geometry_bounds(&self) -> Option<Rect> {
        match self {
            ShapeKind::Rectangle {
                x,
                y,
                width,
                height,
            }
            | ShapeKind::Text {
                x,
                y,
                width,
                height,
                ..
            }
            | ShapeKind::Artboard {
                x,
                y,
                width,
                height,
            } => Some(Rect::new(*x, *y, x + width, y + height)),
            ShapeKind::Ellipse {
                cx,
                cy,
                radius_x,
                radius_y,
            } => Some(Rect::new(
                cx - radius_x,
                cy - radius_y,
                cx + radius_x,
                cy + radius_y,
            )),
            ShapeKind::Path { points, .. } => {
                let mut iter = points.iter().flat_map(|p| {
                    std::iter::once(p.anchor())
                        .chain(p.handle_in)
                        .chain(p.handle_out)
                });
                let first = iter.next()?;
                Some(iter.fold(Rect::from_points(first, first), |r, p| {
                    r.union_pt(p)
                }))
            }
            ShapeKind::Group | ShapeKind::Layer => None,
        }
    }

    /// The same geometry shifted by `delta` in its own space.
    pub fn translated(&self, delta: Vec2) -> ShapeKind {
        let mut kind = self.clone();
        match &mut kind {
            ShapeKind::Rectangle { x, y, .. }
            | ShapeKind::Text { x, y, .. }
            | ShapeKind::Artboard { x, y, .. } => {
                *x += delta.x;
                *y += delta.y;
            }
            ShapeKind::Ellipse { cx, cy, .. } => {
                *cx += delta.x;
                *cy += delta.y;
            }
            ShapeKind::Path { points, .. } => {
                for point in points.iter_mut() {
                    point.translate(delta);
                }
            }
            ShapeKind::Group | ShapeKind::Layer => {}
        }
        kind
    }
}

// ─── Shape item ──────────────────────────────────────────────────────────

fn default_true() -> bool {
    true
}

/// A single item in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeItem {
    pub id: ItemId,

    #[serde(flatten)]
    pub kind: ShapeKind,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(default)]
    pub locked: bool,

    /// Owning group/layer/artboard, if any. Weak: the container does not
    /// list its children.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemId>,

    #[serde(flatten)]
    pub style: Style,

    /// Optional ordered fill/stroke stack. When present it takes precedence
    /// over the flat style fields.
    #[serde(default, skip_serializing_if = "SmallVec::is_empty")]
    pub appearance: SmallVec<[Appearance; 2]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
}

impl ShapeItem {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            id: ItemId::fresh(kind.type_name()),
            kind,
            visible: true,
            locked: false,
            parent: None,
            style: Style::default(),
            appearance: SmallVec::new(),
            transform: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_parent(mut self, parent: ItemId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    /// Effective style with defaults substituted for missing values.
    pub fn resolved_style(&self) -> Style {
        if self.appearance.is_empty() {
            self.style.normalized()
        } else {
            Style::from_appearance(&self.appearance)
        }
    }

    /// The item's transform, or identity when absent.
    pub fn transform_or_identity(&self) -> Transform {
        self.transform.unwrap_or_default()
    }

    /// Geometry space → canvas space. Identity for items without own bounds.
    pub fn to_canvas(&self) -> Affine {
        match (self.kind.geometry_bounds(), self.transform) {
            (Some(bounds), Some(transform)) => transform.to_affine(bounds),
            _ => Affine::IDENTITY,
        }
    }

    /// Canvas-space axis-aligned bounds of the transformed geometry.
    pub fn canvas_bounds(&self) -> Option<Rect> {
        let bounds = self.kind.geometry_bounds()?;
        Some(self.to_canvas().transform_rect_bbox(bounds))
    }

    /// The same item moved by a canvas-space delta.
    ///
    /// Translation is added to the transform when one exists so the pivot
    /// stays attached to the geometry; otherwise the geometry itself moves.
    pub fn translated(&self, delta: Vec2) -> ShapeItem {
        let mut item = self.clone();
        match item.transform.as_mut() {
            Some(t) if !item.kind.is_container() => {
                t.translate_x += delta.x;
                t.translate_y += delta.y;
            }
            _ => item.kind = item.kind.translated(delta),
        }
        item
    }
}
