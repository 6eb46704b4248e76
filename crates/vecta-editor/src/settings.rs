//! Tool settings: last-used creation defaults and the active item override.
//!
//! Two records, one setter. A style change always becomes the new creation
//! default; when an item is selected it is also written to that item as an
//! [`ItemOverride`] patch.

use smallvec::SmallVec;
use vecta_core::document::{DocumentModel, ItemPatch};
use vecta_core::error::DocumentError;
use vecta_core::model::{
    Appearance, AppearanceKind, DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, ShapeItem, ShapeKind, Style,
};
use vecta_core::selection::SelectionState;

/// Values stamped onto newly created items.
#[derive(Debug, Clone, PartialEq)]
pub struct CreationDefaults {
    pub style: Style,
    pub font_family: String,
    pub font_size: f64,
}

impl Default for CreationDefaults {
    fn default() -> Self {
        Self {
            style: Style::default(),
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
        }
    }
}

impl CreationDefaults {
    /// A new item carrying a snapshot of the current style.
    pub fn item(&self, kind: ShapeKind) -> ShapeItem {
        ShapeItem::new(kind).with_style(self.style.normalized())
    }
}

/// One attribute edit from the property panel.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleChange {
    StrokeWidth(f64),
    StrokeColor(String),
    StrokeOpacity(f64),
    FillColor(String),
    FillOpacity(f64),
    FontFamily(String),
    FontSize(f64),
}

impl StyleChange {
    fn apply_to_style(&self, style: &mut Style) {
        match self {
            StyleChange::StrokeWidth(w) => style.stroke_width = *w,
            StyleChange::StrokeColor(c) => style.stroke_color = c.clone(),
            StyleChange::StrokeOpacity(o) => style.stroke_opacity = *o,
            StyleChange::FillColor(c) => style.fill_color = c.clone(),
            StyleChange::FillOpacity(o) => style.fill_opacity = *o,
            StyleChange::FontFamily(_) | StyleChange::FontSize(_) => {}
        }
    }

    /// Write the change into the first appearance entry of the matching
    /// kind, adding one seeded from `style` when the stack has none.
    fn apply_to_appearance(&self, entries: &mut SmallVec<[Appearance; 2]>, style: &Style) {
        let kind = match self {
            StyleChange::StrokeWidth(_) | StyleChange::StrokeColor(_) | StyleChange::StrokeOpacity(_) => {
                AppearanceKind::Stroke
            }
            StyleChange::FillColor(_) | StyleChange::FillOpacity(_) => AppearanceKind::Fill,
            StyleChange::FontFamily(_) | StyleChange::FontSize(_) => return,
        };
        let Some(i) = entries.iter().position(|e| e.kind == kind) else {
            entries.push(match kind {
                AppearanceKind::Fill => Appearance {
                    kind,
                    color: Some(style.fill_color.clone()),
                    opacity: Some(style.fill_opacity),
                    width: None,
                },
                AppearanceKind::Stroke => Appearance {
                    kind,
                    color: Some(style.stroke_color.clone()),
                    opacity: Some(style.stroke_opacity),
                    width: Some(style.stroke_width),
                },
            });
            return;
        };
        let entry = &mut entries[i];
        match self {
            StyleChange::StrokeWidth(w) => entry.width = Some(*w),
            StyleChange::StrokeColor(c) | StyleChange::FillColor(c) => entry.color = Some(c.clone()),
            StyleChange::StrokeOpacity(o) | StyleChange::FillOpacity(o) => entry.opacity = Some(*o),
            StyleChange::FontFamily(_) | StyleChange::FontSize(_) => {}
        }
    }

    fn is_font(&self) -> bool {
        matches!(self, StyleChange::FontFamily(_) | StyleChange::FontSize(_))
    }
}

/// Pending edit of the selected item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemOverride {
    pub index: usize,
    pub style: Style,
    /// Replacement geometry, for font changes on text.
    pub kind: Option<ShapeKind>,
    /// Edited appearance stack, for items that carry one. The stack takes
    /// precedence over flat style fields, so both are written.
    pub appearance: Option<SmallVec<[Appearance; 2]>>,
}

impl ItemOverride {
    fn for_item(index: usize, item: &ShapeItem) -> Self {
        Self {
            index,
            style: item.resolved_style(),
            kind: None,
            appearance: (!item.appearance.is_empty()).then(|| item.appearance.clone()),
        }
    }

    fn apply(&mut self, change: &StyleChange, item: &ShapeItem) {
        change.apply_to_style(&mut self.style);
        if let Some(entries) = self.appearance.as_mut() {
            change.apply_to_appearance(entries, &self.style);
        }
        if !change.is_font() {
            return;
        }
        let mut kind = item.kind.clone();
        if let ShapeKind::Text {
            font_family,
            font_size,
            ..
        } = &mut kind
        {
            match change {
                StyleChange::FontFamily(f) => *font_family = f.clone(),
                StyleChange::FontSize(s) if s.is_finite() && *s > 0.0 => *font_size = *s,
                _ => return,
            }
            self.kind = Some(kind);
        }
    }

    fn into_patch(self) -> ItemPatch {
        ItemPatch {
            kind: self.kind,
            style: Some(self.style.normalized()),
            appearance: self.appearance,
            ..ItemPatch::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    pub defaults: CreationDefaults,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Style shown in the property panel: the selected item's, or the
    /// creation defaults.
    pub fn current_style(&self, selection: &SelectionState) -> Style {
        selection
            .selected_item()
            .map(ShapeItem::resolved_style)
            .unwrap_or_else(|| self.defaults.style.normalized())
    }

    /// Apply one attribute change. Records it as the creation default, and
    /// writes it to the selected item when there is one.
    pub fn set<D: DocumentModel + ?Sized>(
        &mut self,
        change: StyleChange,
        selection: &SelectionState,
        doc: &mut D,
    ) -> Result<(), DocumentError> {
        change.apply_to_style(&mut self.defaults.style);
        match &change {
            StyleChange::FontFamily(f) => self.defaults.font_family = f.clone(),
            StyleChange::FontSize(s) if s.is_finite() && *s > 0.0 => self.defaults.font_size = *s,
            _ => {}
        }

        let Some(index) = selection.selected_index() else {
            return Ok(());
        };
        let Some(item) = doc.get_item_data(index) else {
            return Ok(());
        };
        if item.kind.is_container() {
            return Ok(());
        }
        let mut target = ItemOverride::for_item(index, &item);
        target.apply(&change, &item);
        log::debug!("style override on item {index}: {change:?}");
        doc.update_item(target.index, target.into_patch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vecta_core::document::Document;

    fn rect() -> ShapeItem {
        ShapeItem::new(ShapeKind::Rectangle {
            x: 0.0,
            y: 0.0,
            width: 10.0,
            height: 10.0,
        })
    }

    #[test]
    fn no_selection_updates_defaults_only() {
        let mut doc = Document::from_items(vec![rect()]);
        let selection = SelectionState::new();
        let mut settings = SettingsStore::new();
        settings
            .set(StyleChange::FillColor("#FF0000".into()), &selection, &mut doc)
            .unwrap();
        assert_eq!(settings.defaults.style.fill_color, "#FF0000");
        assert_eq!(doc.items()[0].style.fill_color, "#FFFFFF");
        assert!(doc.take_events().is_empty());
    }

    #[test]
    fn selection_receives_override() {
        let mut doc = Document::from_items(vec![rect()]);
        let mut selection = SelectionState::new();
        selection.select_item(Some(0), &doc);
        let mut settings = SettingsStore::new();
        settings
            .set(StyleChange::StrokeWidth(3.0), &selection, &mut doc)
            .unwrap();
        assert_eq!(doc.items()[0].style.stroke_width, 3.0);
        assert_eq!(settings.defaults.style.stroke_width, 3.0);
    }

    #[test]
    fn override_reaches_an_appearance_stack() {
        let mut item = rect();
        item.appearance.push(Appearance {
            kind: AppearanceKind::Stroke,
            color: Some("#00FF00".into()),
            opacity: None,
            width: Some(2.0),
        });
        let mut doc = Document::from_items(vec![item]);
        let mut selection = SelectionState::new();
        selection.select_item(Some(0), &doc);
        let mut settings = SettingsStore::new();
        settings
            .set(StyleChange::StrokeColor("#FF0000".into()), &selection, &mut doc)
            .unwrap();
        settings
            .set(StyleChange::FillOpacity(0.5), &selection, &mut doc)
            .unwrap();

        let resolved = doc.items()[0].resolved_style();
        assert_eq!(resolved.stroke_color, "#FF0000");
        assert_eq!(resolved.stroke_width, 2.0);
        assert_eq!(resolved.fill_opacity, 0.5);
        assert_eq!(doc.items()[0].appearance.len(), 2);
    }

    #[test]
    fn created_items_snapshot_defaults() {
        let mut defaults = CreationDefaults::default();
        defaults.style.fill_color = "#00FF00".into();
        let item = defaults.item(ShapeKind::Group);
        defaults.style.fill_color = "#0000FF".into();
        assert_eq!(item.style.fill_color, "#00FF00");
    }

    #[test]
    fn font_change_rewrites_text_geometry() {
        let text = ShapeItem::new(ShapeKind::Text {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 40.0,
            content: "hello".into(),
            font_family: "Inter".into(),
            font_size: 16.0,
        });
        let mut doc = Document::from_items(vec![text]);
        let mut selection = SelectionState::new();
        selection.select_item(Some(0), &doc);
        let mut settings = SettingsStore::new();
        settings
            .set(StyleChange::FontSize(24.0), &selection, &mut doc)
            .unwrap();
        assert!(matches!(doc.items()[0].kind, ShapeKind::Text { font_size, .. } if font_size == 24.0));
        assert_eq!(settings.defaults.font_size, 24.0);
    }
}
