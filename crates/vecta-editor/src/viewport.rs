//! Camera control: multiplicative zoom within bounds and clamped panning.
//!
//! The offset is clamped so that at least `min_visible_fraction` of the
//! scaled canvas (or the whole viewport, if smaller) stays on screen.

use vecta_core::config::EditorConfig;
use vecta_core::geometry::{ViewTransform, screen_to_viewport};
use vecta_core::kurbo::{Point, Size, Vec2};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportController {
    view: ViewTransform,
    /// Canvas widget top-left in screen space.
    origin: Point,
    canvas_size: Size,
    viewport_size: Size,
    min_zoom: f64,
    max_zoom: f64,
    zoom_step: f64,
    min_visible_fraction: f64,
}

impl ViewportController {
    pub fn new(config: &EditorConfig, canvas_size: Size, viewport_size: Size) -> Self {
        let (min_zoom, max_zoom) = if config.min_zoom <= config.max_zoom {
            (config.min_zoom, config.max_zoom)
        } else {
            log::warn!(
                "zoom bounds inverted ({} > {}); swapping",
                config.min_zoom,
                config.max_zoom
            );
            (config.max_zoom, config.min_zoom)
        };
        Self {
            view: ViewTransform::default(),
            origin: Point::ZERO,
            canvas_size,
            viewport_size,
            min_zoom,
            max_zoom,
            zoom_step: config.zoom_step,
            min_visible_fraction: config.min_visible_fraction,
        }
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    pub fn zoom(&self) -> f64 {
        self.view.zoom
    }

    pub fn offset(&self) -> Vec2 {
        self.view.offset
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    pub fn set_viewport_size(&mut self, size: Size) {
        self.viewport_size = size;
        self.view.offset = self.clamp_offset(self.view.offset);
    }

    pub fn set_canvas_size(&mut self, size: Size) {
        self.canvas_size = size;
        self.view.offset = self.clamp_offset(self.view.offset);
    }

    /// Screen point → canvas point.
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        self.view.viewport_to_canvas(screen_to_viewport(p, self.origin))
    }

    /// Screen point → viewport point.
    pub fn screen_to_viewport(&self, p: Point) -> Point {
        screen_to_viewport(p, self.origin)
    }

    fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            log::warn!("non-finite zoom {zoom}; resetting to 1");
            1.0_f64.clamp(self.min_zoom, self.max_zoom)
        }
    }

    /// Set zoom, keeping the viewport-space point `at` fixed.
    pub fn set_zoom_at(&mut self, zoom: f64, at: Point) {
        let anchor = self.view.viewport_to_canvas(at);
        self.view.zoom = self.clamp_zoom(zoom);
        let offset = at.to_vec2() - anchor.to_vec2() * self.view.zoom;
        self.view.offset = self.clamp_offset(offset);
        log::trace!("zoom {:.3} offset {:?}", self.view.zoom, self.view.offset);
    }

    /// Set zoom around the viewport center.
    pub fn set_zoom(&mut self, zoom: f64) {
        let center = Point::new(self.viewport_size.width / 2.0, self.viewport_size.height / 2.0);
        self.set_zoom_at(zoom, center);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.view.zoom * self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.view.zoom / self.zoom_step);
    }

    pub fn reset_zoom(&mut self) {
        self.set_zoom(1.0);
    }

    /// One wheel notch at viewport point `at`. Negative delta zooms in.
    pub fn wheel(&mut self, delta: f64, at: Point) {
        if delta == 0.0 || !delta.is_finite() {
            return;
        }
        let zoom = if delta < 0.0 {
            self.view.zoom * self.zoom_step
        } else {
            self.view.zoom / self.zoom_step
        };
        self.set_zoom_at(zoom, at);
    }

    /// Pan by a viewport-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.view.offset = self.clamp_offset(self.view.offset + delta);
    }

    /// Clamp `offset` so the visible share of the canvas stays above the
    /// configured fraction. Non-finite input resets to the origin; an
    /// inverted range leaves that axis unclamped.
    pub fn clamp_offset(&self, offset: Vec2) -> Vec2 {
        let zoom = self.view.zoom;
        if !(offset.x.is_finite() && offset.y.is_finite() && zoom.is_finite()) {
            log::warn!("non-finite pan input (offset {offset:?}, zoom {zoom}); resetting");
            return Vec2::ZERO;
        }
        let x = self.clamp_axis(offset.x, self.canvas_size.width * zoom, self.viewport_size.width);
        let y = self.clamp_axis(offset.y, self.canvas_size.height * zoom, self.viewport_size.height);
        match (x, y) {
            (Some(x), Some(y)) => Vec2::new(x, y),
            _ => {
                log::warn!("non-finite clamp range; resetting offset");
                Vec2::ZERO
            }
        }
    }

    fn clamp_axis(&self, value: f64, scaled: f64, view: f64) -> Option<f64> {
        let visible = (self.min_visible_fraction * scaled).min(view);
        let lo = visible - scaled;
        let hi = view - visible;
        if !(lo.is_finite() && hi.is_finite()) {
            return None;
        }
        if lo > hi {
            log::warn!("inverted clamp range [{lo}, {hi}]; leaving offset unclamped");
            return Some(value);
        }
        Some(value.clamp(lo, hi))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ViewportController {
        ViewportController::new(
            &EditorConfig::default(),
            Size::new(1000.0, 800.0),
            Size::new(500.0, 400.0),
        )
    }

    #[test]
    fn zoom_in_never_exceeds_max() {
        let mut vp = controller();
        for _ in 0..100 {
            vp.zoom_in();
            assert!(vp.zoom() <= 10.0);
        }
        assert_eq!(vp.zoom(), 10.0);
    }

    #[test]
    fn zoom_out_never_below_min() {
        let mut vp = controller();
        for _ in 0..100 {
            vp.zoom_out();
            assert!(vp.zoom() >= 0.1);
        }
        assert_eq!(vp.zoom(), 0.1);
    }

    #[test]
    fn zoom_steps_are_multiplicative() {
        let mut vp = controller();
        vp.zoom_in();
        vp.zoom_in();
        assert!((vp.zoom() - 1.44).abs() < 1e-9);
        vp.zoom_out();
        assert!((vp.zoom() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn wheel_keeps_cursor_point_fixed() {
        let mut vp = controller();
        let cursor = Point::new(120.0, 80.0);
        let before = vp.view().viewport_to_canvas(cursor);
        vp.wheel(-1.0, cursor);
        let after = vp.view().viewport_to_canvas(cursor);
        assert!((before - after).hypot() < 1e-9);
        assert!((vp.zoom() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn clamp_is_idempotent() {
        let vp = controller();
        for raw in [
            Vec2::new(-5000.0, 3000.0),
            Vec2::new(450.0, -700.0),
            Vec2::new(10.0, 10.0),
        ] {
            let once = vp.clamp_offset(raw);
            assert_eq!(vp.clamp_offset(once), once);
        }
    }

    #[test]
    fn clamp_keeps_a_slice_visible() {
        let vp = controller();
        // Canvas 1000 wide at zoom 1: 100 units must stay inside the 500 view.
        assert_eq!(vp.clamp_offset(Vec2::new(-5000.0, 0.0)).x, -900.0);
        assert_eq!(vp.clamp_offset(Vec2::new(5000.0, 0.0)).x, 400.0);
    }

    #[test]
    fn non_finite_resets_to_origin() {
        let mut vp = controller();
        vp.pan_by(Vec2::new(30.0, 30.0));
        assert_eq!(vp.clamp_offset(Vec2::new(f64::NAN, 0.0)), Vec2::ZERO);
        vp.pan_by(Vec2::new(f64::INFINITY, 0.0));
        assert_eq!(vp.offset(), Vec2::ZERO);
    }

    #[test]
    fn screen_to_canvas_accounts_for_origin_and_zoom() {
        let mut vp = controller();
        vp.set_origin(Point::new(100.0, 50.0));
        vp.set_zoom_at(2.0, Point::ZERO);
        assert_eq!(vp.screen_to_canvas(Point::new(140.0, 70.0)), Point::new(20.0, 10.0));
    }
}
