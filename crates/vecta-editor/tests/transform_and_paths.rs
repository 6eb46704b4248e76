//! Integration tests: the transform overlay, path point editing, and
//! camera limits, exercised across the core, render, and editor crates.

use pretty_assertions::assert_eq;
use vecta_core::geometry::anchor_point;
use vecta_core::kurbo::{Point, Size, Vec2};
use vecta_core::{Document, DocumentModel, EditorConfig, PathPoint, ShapeItem, ShapeKind, Transform};
use vecta_editor::{
    EditorEvent, EditorSession, InputEvent, Modifiers, PointerButton, TransformGesture, ViewportController,
};
use vecta_render::overlay::{HandleKind, selection_handles};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn session(items: Vec<ShapeItem>) -> EditorSession<Document> {
    init_logging();
    EditorSession::new(
        Document::from_items(items),
        EditorConfig::default(),
        Size::new(1000.0, 1000.0),
        Size::new(800.0, 600.0),
    )
}

fn drag_with(s: &mut EditorSession<Document>, from: Point, to: Point, modifiers: Modifiers) {
    s.handle(InputEvent::pointer_down(from.x, from.y, PointerButton::Left, modifiers));
    s.handle(InputEvent::pointer_move(to.x, to.y, modifiers));
    s.handle(InputEvent::pointer_up(to.x, to.y, PointerButton::Left, modifiers));
}

fn click(s: &mut EditorSession<Document>, at: Point) {
    s.handle(InputEvent::pointer_down(at.x, at.y, PointerButton::Left, Modifiers::NONE));
    s.handle(InputEvent::pointer_up(at.x, at.y, PointerButton::Left, Modifiers::NONE));
}

fn close(a: Point, b: Point) -> bool {
    (a - b).hypot() < 1e-6
}

fn rotated_rect() -> ShapeItem {
    ShapeItem::new(ShapeKind::Rectangle {
        x: 0.0,
        y: 0.0,
        width: 120.0,
        height: 60.0,
    })
    .with_transform(Transform {
        rotate: 30.0,
        translate_x: 40.0,
        translate_y: 10.0,
        ..Transform::default()
    })
}

fn path_points(s: &EditorSession<Document>, index: usize) -> (Vec<PathPoint>, bool) {
    match s.doc().get_item_data(index).map(|i| i.kind) {
        Some(ShapeKind::Path { points, closed }) => (points, closed),
        other => panic!("expected a path, got {other:?}"),
    }
}

// ─── Resize / rotate ────────────────────────────────────────────────────

#[test]
fn every_resize_grip_keeps_its_anchor_fixed_on_a_rotated_shape() {
    init_logging();
    let item = rotated_rect();
    let bounds = item.kind.geometry_bounds().unwrap();
    let config = EditorConfig::default();

    for layout in selection_handles(&item, 1.0, config.rotate_handle_offset) {
        if layout.kind == HandleKind::Rotate {
            continue;
        }
        for modifiers in [Modifiers::NONE, Modifiers::SHIFT] {
            let (ax, ay) = layout.kind.anchor();
            let anchor = anchor_point(bounds, ax, ay);
            let before = item.to_canvas() * anchor;

            let gesture = TransformGesture::begin(0, &item, layout.kind, layout.position).unwrap();
            let cursor = layout.position + Vec2::new(23.0, -11.0);
            let patch = gesture.update(cursor, modifiers, &config).unwrap();
            let mut next = item.clone();
            patch.apply_to(&mut next).unwrap();

            let after = next.to_canvas() * anchor;
            assert!(
                close(before, after),
                "{:?} {modifiers:?}: anchor moved {before:?} → {after:?}",
                layout.kind
            );
        }
    }
}

#[test]
fn rotate_grip_turns_the_item_about_its_center() {
    let mut s = session(vec![ShapeItem::new(ShapeKind::Rectangle {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 50.0,
    })]);
    s.select(Some(0));
    let grip = s
        .selection_handles()
        .into_iter()
        .find(|h| h.kind == HandleKind::Rotate)
        .unwrap();
    assert!(close(grip.position, Point::new(50.0, -24.0)));

    drag_with(&mut s, grip.position, Point::new(120.0, 31.0), Modifiers::SHIFT);

    // A quarter turn about (50, 25): the top-left corner swings to (75, -25).
    let outline = s.selection_outline().unwrap();
    assert!(close(outline[0], Point::new(75.0, -25.0)), "{outline:?}");

    let item = &s.doc().items()[0];
    let t = item.transform.unwrap();
    assert!((t.rotate - 90.0).abs() < 1e-9, "rotate = {}", t.rotate);
    assert!(close(item.to_canvas() * Point::new(50.0, 25.0), Point::new(50.0, 25.0)));
    assert_eq!(s.doc().committed_steps(), 1);
}

#[test]
fn locked_items_show_no_grips() {
    let mut item = rotated_rect();
    item.locked = true;
    let mut s = session(vec![item]);
    s.select(Some(0));
    assert!(s.selection_handles().is_empty());
}

// ─── Path editing ───────────────────────────────────────────────────────

fn smooth_path() -> ShapeItem {
    ShapeItem::new(ShapeKind::Path {
        points: vec![
            PathPoint::new(0.0, 0.0),
            PathPoint::new(100.0, 0.0)
                .with_handles(Some(Point::new(80.0, 0.0)), Some(Point::new(120.0, 0.0))),
            PathPoint::new(100.0, 100.0),
        ],
        closed: false,
    })
}

fn editing(items: Vec<ShapeItem>) -> EditorSession<Document> {
    let mut s = session(items);
    s.select(Some(0));
    let events = s.toggle_edit_mode();
    assert_eq!(events, vec![EditorEvent::EditModeChanged { active: true }]);
    s
}

#[test]
fn handle_drag_mirrors_the_opposite_handle() {
    let mut s = editing(vec![smooth_path()]);
    click(&mut s, Point::new(100.0, 0.0));
    assert_eq!(s.selection().selected_point_indices(), &[1]);
    // Handles of the selected point are now exposed.
    assert_eq!(s.path_markers().len(), 5);

    drag_with(&mut s, Point::new(120.0, 0.0), Point::new(120.0, 20.0), Modifiers::NONE);

    let (points, _) = path_points(&s, 0);
    assert_eq!(points[1].handle_out, Some(Point::new(120.0, 20.0)));
    assert_eq!(points[1].handle_in, Some(Point::new(80.0, -20.0)));
    assert_eq!(points[1].anchor(), Point::new(100.0, 0.0));
}

#[test]
fn alt_handle_drag_breaks_symmetry() {
    let mut s = editing(vec![smooth_path()]);
    click(&mut s, Point::new(100.0, 0.0));
    drag_with(&mut s, Point::new(80.0, 0.0), Point::new(70.0, 30.0), Modifiers::ALT);

    let (points, _) = path_points(&s, 0);
    assert_eq!(points[1].handle_in, Some(Point::new(70.0, 30.0)));
    assert_eq!(points[1].handle_out, Some(Point::new(120.0, 0.0)));
}

#[test]
fn shift_click_builds_a_multi_point_selection_that_moves_rigidly() {
    let mut s = editing(vec![smooth_path()]);
    click(&mut s, Point::new(0.0, 0.0));
    s.handle(InputEvent::pointer_down(100.0, 100.0, PointerButton::Left, Modifiers::SHIFT));
    s.handle(InputEvent::pointer_up(100.0, 100.0, PointerButton::Left, Modifiers::SHIFT));
    assert_eq!(s.selection().selected_point_indices(), &[0, 2]);

    drag_with(&mut s, Point::new(0.0, 0.0), Point::new(15.0, 5.0), Modifiers::NONE);

    let (points, _) = path_points(&s, 0);
    assert_eq!(points[0].anchor(), Point::new(15.0, 5.0));
    assert_eq!(points[1].anchor(), Point::new(100.0, 0.0));
    assert_eq!(points[2].anchor(), Point::new(115.0, 105.0));
}

#[test]
fn point_drag_on_a_transformed_path_follows_the_cursor() {
    let path = smooth_path().with_transform(Transform {
        translate_x: 200.0,
        translate_y: 100.0,
        ..Transform::default()
    });
    let mut s = editing(vec![path]);
    drag_with(&mut s, Point::new(200.0, 100.0), Point::new(230.0, 140.0), Modifiers::NONE);

    let canvas = s.doc().get_transformed_path_points(0).unwrap();
    assert!(close(canvas[0].anchor(), Point::new(230.0, 140.0)));
    let (points, _) = path_points(&s, 0);
    assert!(close(points[0].anchor(), Point::new(30.0, 40.0)));
}

#[test]
fn point_drag_on_a_rotated_path_leaves_other_points_in_place() {
    let path = ShapeItem::new(ShapeKind::Path {
        points: vec![
            PathPoint::new(0.0, 0.0),
            PathPoint::new(100.0, 0.0),
            PathPoint::new(100.0, 100.0),
        ],
        closed: false,
    })
    .with_transform(Transform {
        rotate: 90.0,
        translate_x: 300.0,
        translate_y: 300.0,
        ..Transform::default()
    });
    let mut s = editing(vec![path]);
    let before = s.doc().get_transformed_path_points(0).unwrap();

    drag_with(&mut s, Point::new(400.0, 300.0), Point::new(400.0, 260.0), Modifiers::NONE);

    let after = s.doc().get_transformed_path_points(0).unwrap();
    assert!(close(after[0].anchor(), Point::new(400.0, 260.0)), "{:?}", after[0]);
    assert!(close(after[2].anchor(), before[2].anchor()), "{:?}", after[2]);
    assert_eq!(s.doc().committed_steps(), 1);
}

#[test]
fn deleting_points_below_the_minimum_removes_the_path() {
    let mut s = editing(vec![smooth_path()]);
    click(&mut s, Point::new(0.0, 0.0));
    s.handle(InputEvent::key("Delete", Modifiers::NONE));
    let (points, closed) = path_points(&s, 0);
    assert_eq!(points.len(), 2);
    assert!(!closed);
    assert!(s.selection().edit_mode_active());

    click(&mut s, Point::new(100.0, 0.0));
    let events = s.handle(InputEvent::key("Delete", Modifiers::NONE));
    assert_eq!(s.doc().item_count(), 0);
    assert!(events.contains(&EditorEvent::SelectionChanged { index: None }));
    assert!(events.contains(&EditorEvent::EditModeChanged { active: false }));
}

#[test]
fn empty_press_in_edit_mode_clears_point_selection() {
    let mut s = editing(vec![smooth_path()]);
    click(&mut s, Point::new(0.0, 0.0));
    assert_eq!(s.selection().selected_point_indices(), &[0]);
    click(&mut s, Point::new(50.0, 50.0));
    assert!(s.selection().selected_point_indices().is_empty());
    assert!(s.selection().edit_mode_active());
}

// ─── Viewport ───────────────────────────────────────────────────────────

#[test]
fn zoom_stays_within_bounds_from_any_input() {
    let mut s = session(Vec::new());
    let ctrl = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };
    for _ in 0..50 {
        s.handle(InputEvent::key("=", ctrl));
    }
    assert_eq!(s.viewport().zoom(), 10.0);
    for _ in 0..100 {
        s.handle(InputEvent::Wheel {
            x: 400.0,
            y: 300.0,
            delta: 3.0,
            modifiers: Modifiers::NONE,
        });
    }
    assert_eq!(s.viewport().zoom(), 0.1);
}

#[test]
fn middle_drag_pans_and_stays_clamped() {
    let mut s = session(Vec::new());
    s.handle(InputEvent::pointer_down(400.0, 300.0, PointerButton::Middle, Modifiers::NONE));
    let mut x = 400.0;
    for _ in 0..40 {
        x -= 150.0;
        let events = s.handle(InputEvent::pointer_move(x, 300.0, Modifiers::NONE));
        assert_eq!(events, vec![EditorEvent::ViewChanged]);
        let offset = s.viewport().offset();
        assert_eq!(s.viewport().clamp_offset(offset), offset);
    }
    s.handle(InputEvent::pointer_up(x, 300.0, PointerButton::Middle, Modifiers::NONE));

    // 10% of the 1000-wide canvas stays inside the viewport.
    assert_eq!(s.viewport().offset().x, -900.0);
}

#[test]
fn clamp_is_idempotent_across_zoom_levels() {
    let mut vp = ViewportController::new(
        &EditorConfig::default(),
        Size::new(1000.0, 1000.0),
        Size::new(800.0, 600.0),
    );
    for zoom in [0.1, 0.35, 1.0, 2.5, 10.0] {
        vp.set_zoom(zoom);
        for raw in [
            Vec2::new(-1e6, 1e6),
            Vec2::new(0.0, 0.0),
            Vec2::new(777.0, -333.0),
        ] {
            let once = vp.clamp_offset(raw);
            assert_eq!(vp.clamp_offset(once), once, "zoom {zoom}, raw {raw:?}");
        }
    }
}

#[test]
fn hidden_items_are_not_selectable_by_click() {
    let mut hidden = ShapeItem::new(ShapeKind::Rectangle {
        x: 0.0,
        y: 0.0,
        width: 100.0,
        height: 100.0,
    });
    hidden.visible = false;
    let mut s = session(vec![hidden]);
    click(&mut s, Point::new(50.0, 50.0));
    assert_eq!(s.selection().selected_index(), None);
}
