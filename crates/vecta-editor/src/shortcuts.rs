//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. Keys reach
//! this map only when the active tool does not capture them (a text box
//! being edited takes typing first).

use crate::input::Modifiers;
use crate::tools::ToolKind;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Tool switching ──
    ToolSelect,
    ToolRect,
    ToolEllipse,
    ToolText,

    // ── Edit ──
    /// Delete selected path points in edit mode, else the selected item.
    Delete,
    /// Abandon the gesture in progress, or leave edit mode, or deselect.
    Cancel,
    /// Enter or leave path edit mode.
    ToggleEditMode,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

impl ShortcutAction {
    /// The tool this action switches to, if it is a tool switch.
    pub fn tool(self) -> Option<ToolKind> {
        match self {
            ShortcutAction::ToolSelect => Some(ToolKind::Select),
            ShortcutAction::ToolRect => Some(ToolKind::Rectangle),
            ShortcutAction::ToolEllipse => Some(ToolKind::Ellipse),
            ShortcutAction::ToolText => Some(ToolKind::Text),
            _ => None,
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"r"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.command() {
            return match key {
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ZoomReset),
                _ => None,
            };
        }

        // Shift alone still lets Escape and Delete through.
        match key {
            "Delete" | "Backspace" => return Some(ShortcutAction::Delete),
            "Escape" => return Some(ShortcutAction::Cancel),
            _ => {}
        }
        if modifiers.shift || modifiers.alt {
            return None;
        }

        // ── Single keys (no modifiers) ──
        match key {
            "v" | "V" => Some(ShortcutAction::ToolSelect),
            "r" | "R" => Some(ShortcutAction::ToolRect),
            "o" | "O" | "e" | "E" => Some(ShortcutAction::ToolEllipse),
            "t" | "T" => Some(ShortcutAction::ToolText),
            "Enter" => Some(ShortcutAction::ToggleEditMode),
            _ => None,
        }
    }
}
