use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tube_line::geom::{Point3, TubeMeshAccumulator, TubeOptions, Vec3};
use tube_line::line::LineNode;

fn random_polyline(rng: &mut StdRng, count: usize) -> Vec<Point3> {
    let mut points = Vec::with_capacity(count);
    let mut current = Point3::ORIGIN;
    for _ in 0..count {
        points.push(current);
        let step = Vec3::new(
            rng.random_range(-4.0..4.0),
            rng.random_range(-4.0..4.0),
            rng.random_range(-4.0..4.0),
        );
        current = current + step;
    }
    points
}

fn random_options(rng: &mut StdRng) -> TubeOptions {
    TubeOptions::default()
        .with_radius(rng.random_range(0.05..1.0))
        .with_edges(rng.random_range(3..16))
        .with_max_turn_steps(rng.random_range(0..9))
}

#[test]
fn buffers_stay_consistent_after_every_edit() {
    let mut rng = StdRng::seed_from_u64(0x7e1e);
    for _ in 0..20 {
        let options = random_options(&mut rng);
        let points = random_polyline(&mut rng, 12);
        let mut acc = TubeMeshAccumulator::new(options).unwrap();

        for &p in &points {
            acc.append(p);
            let snap = acc.snapshot();
            snap.validate().expect("consistent after append");
            assert_eq!(snap.vertex_count() % options.edges, 0);
        }
        while acc.point_count() > 0 {
            let n = rng.random_range(1..4);
            acc.remove_last(n);
            acc.snapshot().validate().expect("consistent after remove");
        }
        assert!(acc.snapshot().is_empty());
        assert!(acc.arc_length().abs() < 1e-12);
    }
}

#[test]
fn append_then_remove_restores_snapshot() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..25 {
        let options = random_options(&mut rng);
        let points = random_polyline(&mut rng, 10);
        let split = rng.random_range(0..points.len());

        let mut acc = TubeMeshAccumulator::new(options).unwrap();
        for &p in &points[..split] {
            acc.append(p);
        }
        let before = acc.snapshot();
        let count_before = acc.point_count();

        for &p in &points[split..] {
            acc.append(p);
        }
        let added = acc.point_count() - count_before;
        acc.remove_last(added);

        assert!(acc.snapshot().approx_eq(&before, 1e-9));
    }
}

#[test]
fn one_at_a_time_matches_bulk_set() {
    let mut rng = StdRng::seed_from_u64(2024);
    for _ in 0..15 {
        let options = random_options(&mut rng);
        let points = random_polyline(&mut rng, 9);

        let mut incremental = LineNode::new(&[], options).unwrap();
        for &p in &points {
            incremental.add(p, None);
        }

        let mut bulk = LineNode::new(&[], options).unwrap();
        bulk.set_points(&points);

        assert!((incremental.length() - bulk.length()).abs() < 1e-9);
        assert!(incremental.snapshot().approx_eq(bulk.snapshot(), 1e-9));
    }
}

#[test]
fn straight_random_lines_never_subdivide() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..15 {
        let direction = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(0.1..1.0),
        )
        .normalized()
        .unwrap();
        let options = random_options(&mut rng).with_max_turn_steps(32);

        let mut acc = TubeMeshAccumulator::new(options).unwrap();
        let mut t = 0.0;
        let mut expected = 0.0;
        for i in 0..10 {
            acc.append(Point3::ORIGIN + direction * t);
            let step = rng.random_range(0.5..6.0);
            if i < 9 {
                expected += step;
            }
            t += step;
        }

        let diag = acc.diagnostics();
        assert_eq!(diag.smoothed_turn_count, 0);
        assert_eq!(diag.ring_count, 10);
        assert!((acc.arc_length() - expected).abs() < 1e-9);
    }
}

#[test]
fn normals_are_unit_length() {
    let mut rng = StdRng::seed_from_u64(5);
    let options = TubeOptions::default().with_radius(0.4).with_max_turn_steps(6);
    let node = LineNode::new(&random_polyline(&mut rng, 30), options).unwrap();
    for n in &node.snapshot().normals {
        assert!((Vec3::from_array(*n).length() - 1.0).abs() < 1e-9);
    }
}
