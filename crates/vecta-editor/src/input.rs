//! Input abstraction layer.
//!
//! Normalizes pointer, wheel, and keyboard events into a unified
//! `InputEvent` enum consumed by the session and the tools. Coordinates
//! arrive in screen space; the session rewrites them to canvas space before
//! a tool sees them.

use vecta_core::kurbo::Point;

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT_BIT: u8 = 1;
    pub const ALT_BIT: u8 = 1 << 1;
    pub const CTRL_BIT: u8 = 1 << 2;
    pub const META_BIT: u8 = 1 << 3;

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };

    /// Decode a platform bitmask (shift = 1, alt = 2, ctrl = 4, meta = 8).
    pub fn from_bits(bits: u8) -> Self {
        Self {
            shift: bits & Self::SHIFT_BIT != 0,
            alt: bits & Self::ALT_BIT != 0,
            ctrl: bits & Self::CTRL_BIT != 0,
            meta: bits & Self::META_BIT != 0,
        }
    }

    pub fn bits(self) -> u8 {
        let mut bits = 0;
        if self.shift {
            bits |= Self::SHIFT_BIT;
        }
        if self.alt {
            bits |= Self::ALT_BIT;
        }
        if self.ctrl {
            bits |= Self::CTRL_BIT;
        }
        if self.meta {
            bits |= Self::META_BIT;
        }
        bits
    }

    /// Platform command key: ⌘ on macOS, Ctrl elsewhere.
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Middle,
    Right,
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },

    /// Pointer moved, with or without a button held.
    PointerMove {
        x: f64,
        y: f64,
        modifiers: Modifiers,
    },

    PointerUp {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },

    /// Synthesized after a release that stayed within the drag threshold.
    /// Positioned at the press location.
    Click {
        x: f64,
        y: f64,
        button: PointerButton,
        modifiers: Modifiers,
    },

    /// Scroll wheel. Negative `delta` scrolls up (zoom in).
    Wheel {
        x: f64,
        y: f64,
        delta: f64,
        modifiers: Modifiers,
    },

    /// `key` is the `KeyboardEvent.key` value (e.g. `"Enter"`, `"a"`).
    Key { key: String, modifiers: Modifiers },

    /// The platform took the pointer away mid-gesture (capture lost,
    /// window blur).
    Cancel,
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64, button: PointerButton, modifiers: Modifiers) -> Self {
        Self::PointerDown {
            x,
            y,
            button,
            modifiers,
        }
    }

    pub fn pointer_move(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Self::PointerMove { x, y, modifiers }
    }

    pub fn pointer_up(x: f64, y: f64, button: PointerButton, modifiers: Modifiers) -> Self {
        Self::PointerUp {
            x,
            y,
            button,
            modifiers,
        }
    }

    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.to_string(),
            modifiers,
        }
    }

    /// Extract position if this is a positioned event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::Click { x, y, .. }
            | Self::Wheel { x, y, .. } => Some(Point::new(*x, *y)),
            Self::Key { .. } | Self::Cancel => None,
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::PointerDown { modifiers, .. }
            | Self::PointerMove { modifiers, .. }
            | Self::PointerUp { modifiers, .. }
            | Self::Click { modifiers, .. }
            | Self::Wheel { modifiers, .. }
            | Self::Key { modifiers, .. } => *modifiers,
            Self::Cancel => Modifiers::NONE,
        }
    }

    /// The same event with its position replaced (e.g. screen → canvas).
    pub fn with_position(&self, p: Point) -> Self {
        let mut event = self.clone();
        match &mut event {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. }
            | Self::Click { x, y, .. }
            | Self::Wheel { x, y, .. } => {
                *x = p.x;
                *y = p.y;
            }
            Self::Key { .. } | Self::Cancel => {}
        }
        event
    }
}

// ─── Click synthesis ─────────────────────────────────────────────────────

/// Turns press → move* → release into a `Click` when the pointer never
/// travelled more than the threshold on either axis.
#[derive(Debug, Default)]
pub struct ClickTracker {
    press: Option<(Point, PointerButton)>,
    exceeded: bool,
}

impl ClickTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a screen-space event. Returns the synthesized click, if any,
    /// which must be dispatched after `event` itself.
    pub fn track(&mut self, event: &InputEvent, threshold: f64) -> Option<InputEvent> {
        match event {
            InputEvent::PointerDown { x, y, button, .. } => {
                self.press = Some((Point::new(*x, *y), *button));
                self.exceeded = false;
                None
            }
            InputEvent::PointerMove { x, y, .. } => {
                if let Some((origin, _)) = self.press
                    && ((x - origin.x).abs() > threshold || (y - origin.y).abs() > threshold)
                {
                    self.exceeded = true;
                }
                None
            }
            InputEvent::PointerUp {
                button, modifiers, ..
            } => {
                let (origin, pressed) = self.press.take()?;
                let exceeded = std::mem::take(&mut self.exceeded);
                (pressed == *button && !exceeded).then_some(InputEvent::Click {
                    x: origin.x,
                    y: origin.y,
                    button: *button,
                    modifiers: *modifiers,
                })
            }
            InputEvent::Cancel => {
                self.reset();
                None
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.press = None;
        self.exceeded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifier_bits_roundtrip() {
        let mods = Modifiers::from_bits(Modifiers::SHIFT_BIT | Modifiers::CTRL_BIT);
        assert!(mods.shift && mods.ctrl && !mods.alt && !mods.meta);
        assert_eq!(mods.bits(), 0b101);
        assert!(mods.command());
    }

    #[test]
    fn click_within_threshold() {
        let mut tracker = ClickTracker::new();
        let left = PointerButton::Left;
        assert!(tracker.track(&InputEvent::pointer_down(10.0, 10.0, left, Modifiers::NONE), 5.0).is_none());
        tracker.track(&InputEvent::pointer_move(13.0, 14.0, Modifiers::NONE), 5.0);
        let click = tracker.track(&InputEvent::pointer_up(13.0, 14.0, left, Modifiers::SHIFT), 5.0);
        assert_eq!(
            click,
            Some(InputEvent::Click {
                x: 10.0,
                y: 10.0,
                button: left,
                modifiers: Modifiers::SHIFT,
            })
        );
    }

    #[test]
    fn drag_suppresses_click() {
        let mut tracker = ClickTracker::new();
        let left = PointerButton::Left;
        tracker.track(&InputEvent::pointer_down(0.0, 0.0, left, Modifiers::NONE), 5.0);
        tracker.track(&InputEvent::pointer_move(6.0, 0.0, Modifiers::NONE), 5.0);
        tracker.track(&InputEvent::pointer_move(0.0, 0.0, Modifiers::NONE), 5.0);
        assert!(tracker.track(&InputEvent::pointer_up(0.0, 0.0, left, Modifiers::NONE), 5.0).is_none());
    }

    #[test]
    fn cancel_drops_pending_press() {
        let mut tracker = ClickTracker::new();
        tracker.track(&InputEvent::pointer_down(0.0, 0.0, PointerButton::Left, Modifiers::NONE), 5.0);
        tracker.track(&InputEvent::Cancel, 5.0);
        assert!(tracker
            .track(&InputEvent::pointer_up(0.0, 0.0, PointerButton::Left, Modifiers::NONE), 5.0)
            .is_none());
    }

    #[test]
    fn with_position_rewrites_coordinates() {
        let e = InputEvent::pointer_move(1.0, 2.0, Modifiers::NONE).with_position(Point::new(5.0, 6.0));
        assert_eq!(e.position(), Some(Point::new(5.0, 6.0)));
        assert!(InputEvent::Cancel.with_position(Point::ZERO).position().is_none());
    }
}
