use proptest::prelude::*;
use std::f64::consts::TAU;
use vecedit::command::{AddNodes, NoEffects, RemoveNodes, SetAttrs};
use vecedit::geometry::shapes::rect_to_vertices;
use vecedit::geometry::tolerance::normalize_angle;
use vecedit::node::record::NodeRecord;
use vecedit::{Bounds, CommandStack, GraphNode, HandleKind, NodeId, NodePatch, Point, Rect, Scene};

#[derive(Clone, Debug)]
enum Op {
    AddRect { x: i16, y: i16, w: u8, h: u8 },
    Move { idx: u16, dx: i8, dy: i8 },
    Rotate { idx: u16, turn: u8 },
    Resize { idx: u16, handle: u8, px: i16, py: i16, keep: bool, center: bool },
    Remove { idx: u16 },
    Undo,
    Redo,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<i16>(), any::<i16>(), 1u8..=255, 1u8..=255).prop_map(|(x, y, w, h)| Op::AddRect { x, y, w, h }),
        (any::<u16>(), any::<i8>(), any::<i8>()).prop_map(|(idx, dx, dy)| Op::Move { idx, dx, dy }),
        (any::<u16>(), any::<u8>()).prop_map(|(idx, turn)| Op::Rotate { idx, turn }),
        (any::<u16>(), 0u8..8, any::<i16>(), any::<i16>(), any::<bool>(), any::<bool>()).prop_map(
            |(idx, handle, px, py, keep, center)| Op::Resize { idx, handle, px, py, keep, center },
        ),
        any::<u16>().prop_map(|idx| Op::Remove { idx }),
        Just(Op::Undo),
        Just(Op::Redo),
    ]
}

fn pick(scene: &Scene, idx: u16) -> Option<NodeId> {
    let nodes = scene.nodes();
    if nodes.is_empty() {
        return None;
    }
    Some(nodes[idx as usize % nodes.len()].id())
}

fn set(stack: &mut CommandStack, scene: &mut Scene, id: NodeId, patch: NodePatch) {
    let cmd = SetAttrs::capture("edit", &*scene, vec![(id, patch)]).unwrap();
    stack.execute(Box::new(cmd), scene).unwrap();
}

fn apply_op(scene: &mut Scene, stack: &mut CommandStack, op: Op) {
    match op {
        Op::AddRect { x, y, w, h } => {
            let node = GraphNode::rect(&mut scene.ids, x as f64 * 0.1, y as f64 * 0.1, w as f64, h as f64);
            stack.execute(Box::new(AddNodes::new("add", vec![node])), scene).unwrap();
        }
        Op::Move { idx, dx, dy } => {
            let Some(id) = pick(scene, idx) else { return };
            let t = scene.nodes().iter().find(|n| n.id() == id).unwrap().transform();
            set(stack, scene, id, NodePatch::transform(t.translated(dx as f64 * 0.5, dy as f64 * 0.5)));
        }
        Op::Rotate { idx, turn } => {
            let Some(id) = pick(scene, idx) else { return };
            set(stack, scene, id, NodePatch { rotate: Some(turn as f64 / 255.0 * TAU), ..Default::default() });
        }
        Op::Resize { idx, handle, px, py, keep, center } => {
            let Some(id) = pick(scene, idx) else { return };
            let mut probe = scene.nodes().iter().find(|n| n.id() == id).unwrap().clone();
            let original = probe.transform_rect();
            let pointer = Point::new(px as f64 * 0.1, py as f64 * 0.1);
            if probe.update_by_control_handle(HandleKind::ALL[handle as usize], pointer, &original, keep, center).is_err() {
                return;
            }
            let patch = NodePatch {
                width: Some(probe.width()),
                height: Some(probe.height()),
                transform: Some(probe.transform()),
                ..Default::default()
            };
            set(stack, scene, id, patch);
        }
        Op::Remove { idx } => {
            let Some(id) = pick(scene, idx) else { return };
            stack.execute(Box::new(RemoveNodes::new("remove", vec![id])), scene).unwrap();
        }
        Op::Undo => {
            stack.undo(scene, &mut NoEffects).unwrap();
        }
        Op::Redo => {
            stack.redo(scene, &mut NoEffects).unwrap();
        }
    }
}

fn records(scene: &Scene) -> Vec<NodeRecord> {
    scene.nodes().iter().map(|n| n.to_record()).collect()
}

fn assert_bbox_fresh(scene: &Scene) {
    for n in scene.nodes() {
        let corners = rect_to_vertices(&Rect::new(0.0, 0.0, n.width(), n.height()), Some(&n.transform()));
        assert_eq!(n.get_bbox(), Bounds::from_quad(&corners), "stale bbox on node {}", n.id());
    }
}

// Separating-axis reference over both quads' edge normals. Returns `None`
// when some axis is too close to touching to call.
fn sat_reference(a: &[Point; 4], b: &[Point; 4]) -> Option<bool> {
    let mut hit = true;
    for quad in [a, b] {
        for i in 0..2 {
            let e = quad[i + 1] - quad[i];
            let axis = Point::new(-e.y, e.x);
            let len = axis.length();
            if len == 0.0 {
                continue;
            }
            let proj = |q: &[Point; 4]| {
                let v: Vec<f64> = q.iter().map(|p| (p.x * axis.x + p.y * axis.y) / len).collect();
                (v.iter().cloned().fold(f64::INFINITY, f64::min), v.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
            };
            let (a0, a1) = proj(a);
            let (b0, b1) = proj(b);
            let overlap = a1.min(b1) - a0.max(b0);
            if overlap.abs() < 1e-6 {
                return None;
            }
            if overlap < 0.0 {
                hit = false;
            }
        }
    }
    Some(hit)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 512, .. ProptestConfig::default() })]

    #[test]
    fn undoing_everything_restores_the_start(seq in prop::collection::vec(op_strategy(), 5..40)) {
        let mut scene = Scene::new();
        let seed: Vec<GraphNode> = (0..3)
            .map(|i| GraphNode::rect(&mut scene.ids, i as f64 * 30.0, 5.0, 20.0, 10.0))
            .collect();
        scene.add_items(seed).unwrap();
        let start = records(&scene);

        let mut stack = CommandStack::default();
        for op in seq {
            apply_op(&mut scene, &mut stack, op);
            assert_bbox_fresh(&scene);
        }
        while stack.undo(&mut scene, &mut NoEffects).unwrap() {}
        prop_assert_eq!(records(&scene), start);
        assert_bbox_fresh(&scene);
    }

    #[test]
    fn bbox_is_tight_around_corners(
        w in 0.0f64..500.0,
        h in 0.0f64..500.0,
        angle in -10.0f64..10.0,
        sx in 0.1f64..5.0,
        sy in 0.1f64..5.0,
        tx in -1000.0f64..1000.0,
        ty in -1000.0f64..1000.0,
    ) {
        let mut ids = vecedit::node::ident::IdAllocator::new();
        let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, w, h);
        let t = vecedit::Transform::scale(sx, sy).append(vecedit::Transform::rotation(angle)).translated(tx, ty);
        n.update_attrs(&NodePatch::transform(t));
        let b = n.get_bbox();
        let corners = rect_to_vertices(&Rect::new(0.0, 0.0, w, h), Some(&t));
        for c in &corners {
            prop_assert!(c.x >= b.min_x && c.x <= b.max_x && c.y >= b.min_y && c.y <= b.max_y);
        }
        prop_assert!(corners.iter().any(|c| c.x == b.min_x));
        prop_assert!(corners.iter().any(|c| c.x == b.max_x));
        prop_assert!(corners.iter().any(|c| c.y == b.min_y));
        prop_assert!(corners.iter().any(|c| c.y == b.max_y));
    }

    #[test]
    fn set_rotate_reads_back(angle in -20.0f64..20.0, start in -3.0f64..3.0, cx in -50.0f64..50.0, cy in -50.0f64..50.0) {
        let mut ids = vecedit::node::ident::IdAllocator::new();
        let mut n = GraphNode::rect(&mut ids, 10.0, 20.0, 40.0, 30.0);
        n.set_rotate(start, None);
        n.set_rotate(angle, Some(Point::new(cx, cy)));
        let d = (n.rotate() - normalize_angle(angle)).abs();
        prop_assert!(d.min(TAU - d) < 1e-9, "got {} want {}", n.rotate(), angle);
    }

    #[test]
    fn intersect_matches_separating_axis_reference(
        w in 1.0f64..200.0,
        h in 1.0f64..200.0,
        angle in 0.0f64..TAU,
        bx in -300.0f64..300.0,
        by in -300.0f64..300.0,
        bw in 0.5f64..150.0,
        bh in 0.5f64..150.0,
    ) {
        let mut ids = vecedit::node::ident::IdAllocator::new();
        let mut n = GraphNode::rect(&mut ids, 0.0, 0.0, w, h);
        n.set_rotate(angle, None);
        let quad = rect_to_vertices(&Rect::new(0.0, 0.0, w, h), Some(&n.transform()));
        let query = Bounds::new(bx, by, bx + bw, by + bh);
        let boxq = rect_to_vertices(&query.to_rect(), None);
        if let Some(expected) = sat_reference(&quad, &boxq) {
            prop_assert_eq!(n.intersect_with_box(&query), expected);
        }
    }
}
