use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use vecedit::geometry::shapes::rect_to_vertices;
use vecedit::node::ident::IdAllocator;
use vecedit::{Bounds, GraphNode, HandleKind, NodePatch, Point, Rect, Transform};

fn close(a: f64, b: f64) -> bool { (a - b).abs() < 1e-9 }

fn bounds_close(a: Bounds, b: Bounds) -> bool {
    close(a.min_x, b.min_x) && close(a.min_y, b.min_y) && close(a.max_x, b.max_x) && close(a.max_y, b.max_y)
}

#[test]
fn rect_bbox_and_quarter_turn_about_center() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 10.0, 10.0, 100.0, 50.0);
    assert_eq!(n.get_bbox(), Bounds::new(10.0, 10.0, 110.0, 60.0));
    assert_eq!(n.center(), Point::new(60.0, 35.0));

    n.set_rotate(FRAC_PI_2, Some(Point::new(60.0, 35.0)));
    let b = n.get_bbox();
    assert!(bounds_close(b, Bounds::new(35.0, -15.0, 85.0, 85.0)), "{b:?}");
    assert!(close(n.rotate(), FRAC_PI_2));
}

#[test]
fn right_angle_rotations_swap_or_keep_extent() {
    let mut ids = IdAllocator::new();
    for (k, swapped) in [(0.0, false), (1.0, true), (2.0, false), (3.0, true)] {
        let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 80.0, 30.0);
        n.set_rotate(k * FRAC_PI_2, None);
        let b = n.get_bbox();
        let (w, h) = if swapped { (30.0, 80.0) } else { (80.0, 30.0) };
        assert!(close(b.width(), w) && close(b.height(), h), "k={k} {b:?}");
        // rotation about the node's own centre keeps the centre
        assert!(close(b.center().x, 40.0) && close(b.center().y, 15.0));
    }
}

#[test]
fn stroke_bbox_inflates_by_half_width() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 10.0, 10.0);
    n.update_attrs(&NodePatch { stroke_width: Some(4.0), ..Default::default() });
    assert_eq!(n.get_bbox(), Bounds::new(0.0, 0.0, 10.0, 10.0));
    assert_eq!(n.get_bbox_with_stroke(), Bounds::new(-2.0, -2.0, 12.0, 12.0));
}

#[test]
fn geometry_updates_invalidate_and_others_keep_cache() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 10.0, 10.0);
    let before = n.get_bbox();
    n.get_bbox_with_stroke();
    assert!(n.has_cached_bbox());

    n.update_attrs(&NodePatch { visible: Some(false), lock: Some(true), ..Default::default() });
    assert!(n.has_cached_bbox());
    assert_eq!(n.get_bbox(), before);

    // unchanged value is not an invalidation
    n.update_attrs(&NodePatch { width: Some(10.0), ..Default::default() });
    assert!(n.has_cached_bbox());

    n.update_attrs(&NodePatch { x: Some(5.0), ..Default::default() });
    assert!(!n.has_cached_bbox());
    assert_eq!(n.get_bbox(), Bounds::new(5.0, 0.0, 15.0, 10.0));

    n.update_attrs(&NodePatch { height: Some(20.0), ..Default::default() });
    assert_eq!(n.get_bbox(), Bounds::new(5.0, 0.0, 15.0, 20.0));
}

#[test]
fn explicit_transform_wins_over_xy() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 10.0, 10.0);
    n.update_attrs(&NodePatch {
        x: Some(100.0),
        y: Some(100.0),
        transform: Some(Transform::translation(3.0, 4.0)),
        ..Default::default()
    });
    assert_eq!((n.x(), n.y()), (3.0, 4.0));
}

#[test]
fn extra_keys_merge_and_null_removes() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 10.0, 10.0);
    let patch: NodePatch = serde_json::from_str(r#"{"opacity": 0.5, "blend": "multiply"}"#).unwrap();
    n.update_attrs(&patch);
    assert_eq!(n.attrs().extra.get("opacity"), Some(&serde_json::json!(0.5)));

    let patch: NodePatch = serde_json::from_str(r#"{"opacity": null}"#).unwrap();
    n.update_attrs(&patch);
    assert!(n.attrs().extra.get("opacity").is_none());
    assert!(n.attrs().extra.get("blend").is_some());
}

#[test]
fn rotate_patch_turns_about_center() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 20.0, 20.0);
    n.update_attrs(&NodePatch { rotate: Some(FRAC_PI_4), ..Default::default() });
    assert!(close(n.rotate(), FRAC_PI_4));
    let c = n.center();
    assert!(close(c.x, 10.0) && close(c.y, 10.0));
}

#[test]
fn hit_test_pads_by_half_stroke() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 10.0, 10.0);
    assert!(n.hit_test(5.0, 5.0, 0.0));
    assert!(!n.hit_test(11.0, 5.0, 0.0));
    assert!(n.hit_test(11.0, 5.0, 1.5));
    n.update_attrs(&NodePatch { stroke_width: Some(4.0), ..Default::default() });
    assert!(n.hit_test(11.0, 5.0, 0.0));
}

#[test]
fn hit_test_follows_rotation() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 100.0, 10.0);
    n.set_rotate(FRAC_PI_2, None);
    // now a vertical bar centred on (50, 5)
    assert!(n.hit_test(50.0, 40.0, 0.0));
    assert!(!n.hit_test(90.0, 5.0, 0.0));
}

#[test]
fn intersect_with_box_cases() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 100.0, 100.0);
    assert!(!n.intersect_with_box(&Bounds::new(200.0, 200.0, 210.0, 210.0)));
    assert!(n.intersect_with_box(&Bounds::new(-100.0, -100.0, 300.0, 300.0)));
    assert!(n.intersect_with_box(&Bounds::new(90.0, 90.0, 110.0, 110.0)));

    n.set_rotate(FRAC_PI_4, None);
    let corner = Bounds::new(-20.0, -20.0, -10.0, -10.0);
    assert!(n.get_bbox().min_x < -20.0, "box is inside the rotated AABB");
    assert!(!n.intersect_with_box(&corner));
    // the top vertex of the diamond sits at (50, 50 - 50√2)
    assert!(n.intersect_with_box(&Bounds::new(45.0, -25.0, 55.0, -15.0)));
}

#[test]
fn contain_with_box_is_symmetric() {
    let mut ids = IdAllocator::new();
    let n = GraphNode::rect(&mut ids, 10.0, 10.0, 10.0, 10.0);
    assert!(n.contain_with_box(&Bounds::new(0.0, 0.0, 100.0, 100.0)));
    assert!(n.contain_with_box(&Bounds::new(12.0, 12.0, 13.0, 13.0)));
    assert!(!n.contain_with_box(&Bounds::new(15.0, 15.0, 40.0, 40.0)));
}

#[test]
fn d_rotate_rederives_from_drag_start() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 40.0, 20.0);
    let start = n.transform();
    let c = n.center();
    for step in 1..=10 {
        n.d_rotate(PI * step as f64 / 10.0, start, c);
    }
    assert!(close(n.rotate(), PI));
    let c2 = n.center();
    assert!(close(c2.x, c.x) && close(c2.y, c.y));
}

#[test]
fn d_move_translates_every_node() {
    let mut ids = IdAllocator::new();
    let mut a = GraphNode::rect(&mut ids, 0.0, 0.0, 10.0, 10.0);
    let mut b = GraphNode::ellipse(&mut ids, 5.0, 5.0, 10.0, 10.0);
    a.get_bbox();
    GraphNode::d_move([&mut a, &mut b], 3.0, -2.0);
    assert_eq!((a.x(), a.y()), (3.0, -2.0));
    assert_eq!((b.x(), b.y()), (8.0, 3.0));
    assert_eq!(a.get_bbox(), Bounds::new(3.0, -2.0, 13.0, 8.0));
}

#[test]
fn control_handle_resize_on_rotated_rect() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, 100.0, 50.0);
    n.set_rotate(FRAC_PI_2, None);
    let original = n.transform_rect();
    // local (120, 50) is where the se corner should land
    let target = original.transform.apply(Point::new(120.0, 50.0));
    n.update_by_control_handle(HandleKind::Se, target, &original, false, false).unwrap();
    assert!(close(n.width(), 120.0) && close(n.height(), 50.0));
    // nw corner did not move
    let nw = n.transform().apply(Point::ZERO);
    let nw0 = original.transform.apply(Point::ZERO);
    assert!(close(nw.x, nw0.x) && close(nw.y, nw0.y));
    assert!(close(n.rotate(), FRAC_PI_2));
}

#[test]
fn control_handle_resize_on_line() {
    let mut ids = IdAllocator::new();
    let mut line = GraphNode::line(&mut ids, Point::new(0.0, 0.0), Point::new(100.0, 0.0), 2.0);
    let original = line.transform_rect();
    line.update_by_control_handle(HandleKind::W, Point::new(-50.0, 0.0), &original, false, true).unwrap();
    assert!(close(line.width(), 200.0));
    assert_eq!(line.height(), 0.0);
    assert!(line.update_by_control_handle(HandleKind::N, Point::new(0.0, 9.0), &original, false, false).is_err());
}

#[test]
fn bbox_of_rotated_corners_matches_vertices() {
    let mut ids = IdAllocator::new();
    let mut n = GraphNode::rect(&mut ids, 3.0, 7.0, 30.0, 12.0);
    n.update_attrs(&NodePatch::transform(
        Transform::scale(2.0, 0.5).append(Transform::rotation(0.3)).translated(3.0, 7.0),
    ));
    let corners = rect_to_vertices(&Rect::new(0.0, 0.0, 30.0, 12.0), Some(&n.transform()));
    assert_eq!(n.get_bbox(), Bounds::from_quad(&corners));
}

#[test]
fn names_are_generated_per_kind() {
    let mut ids = IdAllocator::new();
    let a = GraphNode::rect(&mut ids, 0.0, 0.0, 1.0, 1.0);
    let b = GraphNode::rect(&mut ids, 0.0, 0.0, 1.0, 1.0);
    let e = GraphNode::ellipse(&mut ids, 0.0, 0.0, 1.0, 1.0);
    assert_eq!((a.name(), b.name(), e.name()), ("Rect 1", "Rect 2", "Ellipse 1"));
    assert_ne!(a.id(), b.id());
}
