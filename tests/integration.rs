use tube_line::TubeEngine;
use tube_line::geom::{Point3, SegmentRole, TubeError, TubeOptions};
use tube_line::line::{LineNode, RemovePolicy};

fn pts(coords: &[[f64; 3]]) -> Vec<Point3> {
    coords.iter().copied().map(Point3::from).collect()
}

#[test]
fn engine_builds_two_point_tube() {
    let mut engine = TubeEngine::with_options(TubeOptions::default()).expect("default options");
    assert!(engine.add_point(0.0, 0.0, 0.0));
    assert!(engine.add_point(0.0, 0.0, 10.0));

    assert_eq!(engine.positions().len(), 24 * 3);
    assert_eq!(engine.normals().len(), 24 * 3);
    assert_eq!(engine.uvs().len(), 24 * 2);
    assert_eq!(engine.indices().len(), 72);
    assert!((engine.length() - 10.0).abs() < 1e-12);
    assert_eq!(engine.point_count(), 2);
}

#[test]
fn engine_rejects_invalid_options() {
    let err = TubeEngine::with_options(TubeOptions::default().with_edges(1)).err();
    assert_eq!(err, Some(TubeError::NotEnoughEdges { min: 3, actual: 1 }));
}

#[test]
fn engine_set_points_and_remove() {
    let mut engine = TubeEngine::with_options(TubeOptions::default()).unwrap();
    engine
        .set_points(&[0.0, 0.0, 0.0, 3.0, 0.0, 0.0, 3.0, 3.0, 0.0])
        .expect("triples");
    assert_eq!(engine.point_count(), 3);

    assert_eq!(engine.remove_points(5), 3);
    assert!(engine.positions().is_empty());
    assert!(engine.length().abs() < 1e-12);
}

#[test]
fn engine_duplicate_point_is_ignored() {
    let mut engine = TubeEngine::with_options(TubeOptions::default()).unwrap();
    engine.add_point(1.0, 1.0, 1.0);
    assert!(!engine.add_point(1.0, 1.0, 1.0));
    assert_eq!(engine.point_count(), 1);
    assert!(engine.diagnostics_summary().contains("ignored:1"));
}

#[test]
fn engine_full_clear_policy() {
    let mut engine = TubeEngine::with_options(TubeOptions::default()).unwrap();
    engine
        .set_points(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0, 0.0, 0.0])
        .unwrap();
    engine.set_full_clear_below(10);
    assert_eq!(engine.remove_points(1), 4);
    assert_eq!(engine.point_count(), 0);
}

#[test]
fn engine_live_parameter_changes() {
    let mut engine = TubeEngine::with_options(TubeOptions::default()).unwrap();
    engine.set_points(&[0.0, 0.0, 0.0, 0.0, 0.0, 5.0]).unwrap();

    engine.set_edges(6).expect("six edges");
    assert_eq!(engine.positions().len(), 12 * 3);

    engine.set_radius(0.5).expect("positive radius");
    assert_eq!(engine.positions().len(), 12 * 3);

    engine.set_max_turning(8).expect("within cap");
    assert!(engine.set_max_turning(u32::MAX).is_err());
    let geometry = engine.geometry();
    assert_eq!(geometry.vertex_count, 12);
    assert_eq!(geometry.triangle_count, 12);
}

#[test]
fn node_bulk_and_incremental_agree() {
    let coords = [
        [0.0, 0.0, 0.0],
        [4.0, 0.0, 0.0],
        [4.0, 4.0, 0.0],
        [0.0, 4.0, 3.0],
        [0.0, 0.0, 3.0],
    ];
    let points = pts(&coords);
    let options = TubeOptions::default().with_radius(0.5);

    let bulk = LineNode::new(&points, options).unwrap();

    let mut incremental = LineNode::new(&[], options).unwrap();
    for &p in &points {
        incremental.add(p, None);
    }

    let mut diffed = LineNode::new(&points[..2], options).unwrap();
    diffed.set_points(&points);

    assert!((bulk.length() - incremental.length()).abs() < 1e-12);
    assert!((bulk.length() - diffed.length()).abs() < 1e-12);
    assert_eq!(bulk.snapshot(), incremental.snapshot());
    assert_eq!(bulk.snapshot(), diffed.snapshot());
}

#[test]
fn node_roles_follow_point_count() {
    let mut node = LineNode::new(&[], TubeOptions::default()).unwrap();
    node.add(Point3::ORIGIN, None);
    assert!(node.accumulator().segment_roles().is_empty());

    node.add(Point3::new(2.0, 0.0, 0.0), None);
    assert_eq!(
        node.accumulator().segment_roles(),
        vec![SegmentRole::First, SegmentRole::Last]
    );

    node.add(Point3::new(2.0, 2.0, 0.0), Some(Point3::new(4.0, 0.0, 0.0)));
    assert_eq!(
        node.accumulator().segment_roles(),
        vec![
            SegmentRole::First,
            SegmentRole::Middle,
            SegmentRole::Middle,
            SegmentRole::Last
        ]
    );
}

#[test]
fn node_lazy_radius_is_baked_by_rebuild() {
    let points = pts(&[[0.0, 0.0, 0.0], [0.0, 0.0, 5.0], [0.0, 0.0, 10.0]]);
    let mut node = LineNode::new(&points, TubeOptions::default()).unwrap();
    let before = node.snapshot().clone();

    node.set_radius(2.0).unwrap();
    assert_eq!(node.snapshot(), &before);

    node.rebuild();
    let fresh = LineNode::new(&points, TubeOptions::default().with_radius(2.0)).unwrap();
    assert_eq!(node.snapshot(), fresh.snapshot());
}

#[test]
fn node_remove_policy_defaults_to_exact() {
    let node = LineNode::new(&[], TubeOptions::default()).unwrap();
    assert_eq!(node.remove_policy(), RemovePolicy::exact());
}

#[test]
fn node_diagnostics_report_state() {
    let points = pts(&[[0.0, 0.0, 0.0], [0.0, 0.0, 5.0], [0.0, 0.0, 5.0], [0.0, 3.0, 5.0]]);
    let node = LineNode::new(&points, TubeOptions::default()).unwrap();
    let diag = node.diagnostics();

    assert_eq!(diag.point_count, 3);
    assert_eq!(diag.ignored_point_count, 1);
    assert_eq!(diag.vertex_count, node.snapshot().vertex_count());
    assert!(!diag.is_clean());
    assert!(format!("{diag}").contains("Ignored points: 1"));
}
