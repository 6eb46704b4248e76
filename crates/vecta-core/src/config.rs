//! Tunable constants for the interaction layer.

use serde::Deserialize;

/// Editor configuration.
///
/// Every field has a default; a host can deserialize a partial JSON object
/// and only override what it cares about.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    /// Pointer travel (screen units, either axis) that turns a press into a drag.
    pub drag_threshold: f64,
    /// Per-frame raw pan deltas are clamped to ± this value.
    pub pan_delta_clamp: f64,
    /// Number of pan samples averaged for smoothing.
    pub pan_smoothing_window: usize,
    /// Rectangles and ellipses are kept only when both sides exceed this.
    pub min_shape_size: f64,
    /// Text boxes are kept only when both sides exceed this.
    pub min_text_box_size: f64,
    /// Floor applied while resizing a text box being edited.
    pub text_box_min_width: f64,
    pub text_box_min_height: f64,
    /// Rotation snap increment while Shift is held.
    pub rotation_snap_degrees: f64,
    /// Extra pick margin added around path bounds, beyond half the stroke.
    pub path_hit_margin: f64,
    /// Radius (screen units) within which a handle counts as hit.
    pub handle_hit_radius: f64,
    /// Distance (screen units) of the rotation handle above the top edge.
    pub rotate_handle_offset: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Multiplicative zoom ratio per wheel notch or button press.
    pub zoom_step: f64,
    /// Fraction of the scaled canvas that must stay inside the viewport.
    pub min_visible_fraction: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 5.0,
            pan_delta_clamp: 200.0,
            pan_smoothing_window: 3,
            min_shape_size: 1.0,
            min_text_box_size: 10.0,
            text_box_min_width: 50.0,
            text_box_min_height: 30.0,
            rotation_snap_degrees: 15.0,
            path_hit_margin: 2.0,
            handle_hit_radius: 6.0,
            rotate_handle_offset: 24.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
            zoom_step: 1.2,
            min_visible_fraction: 0.1,
        }
    }
}
