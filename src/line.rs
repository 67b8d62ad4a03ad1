//! Host-side line node.
//!
//! [`LineNode`] is what an application holds on to: it forwards point edits to
//! the accumulator, keeps the latest [`MeshSnapshot`] ready for the renderer
//! and times every edit when metrics are enabled.

use crate::geom::{
    CircleSection, CrossSectionSampler, MeshSnapshot, Point3, TimingBucket, TubeDiagnostics,
    TubeError, TubeMeshAccumulator, TubeMetrics, TubeOptions, TubeTimingReport,
};

/// How [`LineNode::remove`] treats short lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RemovePolicy {
    /// Lines with fewer points than this are cleared entirely by any removal.
    /// `0` disables the rule so removals are always exact.
    pub full_clear_below: usize,
}

impl RemovePolicy {
    #[must_use]
    pub fn exact() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn full_clear_below(points: usize) -> Self {
        Self {
            full_clear_below: points,
        }
    }

    fn count_to_remove(self, requested: usize, available: usize) -> usize {
        if self.full_clear_below > 0 && available < self.full_clear_below {
            available
        } else {
            requested.min(available)
        }
    }
}

/// A point as the caller supplied it, and whether the accumulator kept it.
#[derive(Debug, Clone, Copy)]
struct InputPoint {
    point: Point3,
    accepted: bool,
}

/// Bitwise so that ignored non-finite points still match themselves.
fn same_input(a: Point3, b: Point3) -> bool {
    a.to_array()
        .iter()
        .zip(b.to_array())
        .all(|(x, y)| x.to_bits() == y.to_bits())
}

fn append_input<S: CrossSectionSampler>(
    accumulator: &mut TubeMeshAccumulator<S>,
    input: &mut Vec<InputPoint>,
    point: Point3,
) -> bool {
    let accepted = accumulator.append(point);
    input.push(InputPoint { point, accepted });
    accepted
}

/// Drops input past `len` and the accepted points among it.
fn truncate_input<S: CrossSectionSampler>(
    accumulator: &mut TubeMeshAccumulator<S>,
    input: &mut Vec<InputPoint>,
    len: usize,
) -> usize {
    let accepted = input.iter().skip(len).filter(|p| p.accepted).count();
    input.truncate(len);
    accumulator.remove_last(accepted)
}

pub struct LineNode<S: CrossSectionSampler = CircleSection> {
    accumulator: TubeMeshAccumulator<S>,
    /// Every point handed in, ignored ones included; replaying it reproduces
    /// the accumulator.
    input: Vec<InputPoint>,
    policy: RemovePolicy,
    snapshot: MeshSnapshot,
    metrics: TubeMetrics,
}

impl LineNode<CircleSection> {
    pub fn new(points: &[Point3], options: TubeOptions) -> Result<Self, TubeError> {
        Self::with_sampler(points, options, CircleSection)
    }
}

impl<S: CrossSectionSampler> LineNode<S> {
    pub fn with_sampler(points: &[Point3], options: TubeOptions, sampler: S) -> Result<Self, TubeError> {
        let mut node = Self {
            accumulator: TubeMeshAccumulator::with_sampler(options, sampler)?,
            input: Vec::with_capacity(points.len()),
            policy: RemovePolicy::default(),
            snapshot: MeshSnapshot::default(),
            metrics: TubeMetrics::default(),
        };
        node.metrics.begin();
        if points.is_empty() {
            return Ok(node);
        }
        let (accumulator, input) = (&mut node.accumulator, &mut node.input);
        node.metrics.time(TimingBucket::Rebuild, || {
            for &point in points {
                append_input(accumulator, input, point);
            }
        });
        node.refresh();
        Ok(node)
    }

    #[must_use]
    pub fn with_remove_policy(mut self, policy: RemovePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_remove_policy(&mut self, policy: RemovePolicy) {
        self.policy = policy;
    }

    /// Appends `point`, preceded by `with_previous` when given.
    /// Returns whether `point` itself was accepted.
    pub fn add(&mut self, point: Point3, with_previous: Option<Point3>) -> bool {
        let (accumulator, input) = (&mut self.accumulator, &mut self.input);
        let accepted = self.metrics.time(TimingBucket::Append, || {
            if let Some(previous) = with_previous {
                append_input(accumulator, input, previous);
            }
            append_input(accumulator, input, point)
        });
        self.refresh();
        accepted
    }

    /// Replaces the whole point list.
    ///
    /// The list is compared with the previous input, ignored points included.
    /// Points past the shared prefix are removed and the rest of `points` is
    /// appended, so growing or shrinking the list only touches the tail.
    pub fn set_points(&mut self, points: &[Point3]) {
        let shared = self
            .input
            .iter()
            .zip(points)
            .take_while(|(kept, point)| same_input(kept.point, **point))
            .count();
        let stale = self.input.len() - shared;
        let (accumulator, input) = (&mut self.accumulator, &mut self.input);

        if stale > 0 {
            if shared < points.len() {
                log::debug!("point list diverges at {shared}; replacing {stale} inputs");
            }
            self.metrics.time(TimingBucket::Remove, || {
                truncate_input(accumulator, input, shared);
            });
        }
        if shared < points.len() {
            self.metrics.time(TimingBucket::Append, || {
                for &point in &points[shared..] {
                    append_input(accumulator, input, point);
                }
            });
        }
        self.refresh();
    }

    /// Removes up to `n` points from the end, following the remove policy.
    /// Ignored inputs do not count toward `n`.
    pub fn remove(&mut self, n: usize) -> usize {
        let mut remaining = self.policy.count_to_remove(n, self.accumulator.point_count());
        let mut keep = self.input.len();
        while remaining > 0 && keep > 0 {
            keep -= 1;
            if self.input[keep].accepted {
                remaining -= 1;
            }
        }
        let (accumulator, input) = (&mut self.accumulator, &mut self.input);
        let removed = self
            .metrics
            .time(TimingBucket::Remove, || truncate_input(accumulator, input, keep));
        self.refresh();
        removed
    }

    /// Takes effect for rings built after this call.
    pub fn set_radius(&mut self, radius: f64) -> Result<(), TubeError> {
        self.accumulator.set_radius(radius)
    }

    pub fn set_edges(&mut self, edges: usize) -> Result<(), TubeError> {
        let accumulator = &mut self.accumulator;
        self.metrics
            .time(TimingBucket::Rebuild, || accumulator.set_edge_count(edges))?;
        self.refresh();
        Ok(())
    }

    pub fn set_max_turning(&mut self, max_turn_steps: usize) -> Result<(), TubeError> {
        let accumulator = &mut self.accumulator;
        self.metrics
            .time(TimingBucket::Rebuild, || accumulator.set_max_turn_steps(max_turn_steps))?;
        self.refresh();
        Ok(())
    }

    /// Bakes the current radius into every ring.
    pub fn rebuild(&mut self) {
        let accumulator = &mut self.accumulator;
        self.metrics.time(TimingBucket::Rebuild, || accumulator.rebuild());
        self.refresh();
    }

    fn refresh(&mut self) {
        let accumulator = &self.accumulator;
        self.snapshot = self.metrics.time(TimingBucket::Snapshot, || accumulator.snapshot());
        log::debug!("line node {}", self.accumulator.diagnostics().summary());
    }

    #[must_use]
    pub fn snapshot(&self) -> &MeshSnapshot {
        &self.snapshot
    }

    /// Total arc length of the tube.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.snapshot.arc_length
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        self.accumulator.points()
    }

    #[must_use]
    pub fn options(&self) -> &TubeOptions {
        self.accumulator.options()
    }

    #[must_use]
    pub fn remove_policy(&self) -> RemovePolicy {
        self.policy
    }

    #[must_use]
    pub fn accumulator(&self) -> &TubeMeshAccumulator<S> {
        &self.accumulator
    }

    #[must_use]
    pub fn diagnostics(&self) -> TubeDiagnostics {
        TubeDiagnostics {
            timing: self.timing(),
            ..self.accumulator.diagnostics()
        }
    }

    /// Cumulative edit timings, `None` unless the `tube_metrics` feature is on.
    #[must_use]
    pub fn timing(&self) -> Option<TubeTimingReport> {
        self.metrics.end()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;
    use crate::geom::{Quat, Vec3};

    fn pts(coords: &[[f64; 3]]) -> Vec<Point3> {
        coords.iter().copied().map(Point3::from).collect()
    }

    /// Circle sampler that counts how many rings it produced.
    #[derive(Clone, Default)]
    struct CountingSection {
        calls: Rc<Cell<usize>>,
    }

    impl CrossSectionSampler for CountingSection {
        fn sample(&self, radius: f64, edge_count: usize, orientation: Option<Quat>) -> Vec<Vec3> {
            self.calls.set(self.calls.get() + 1);
            CircleSection.sample(radius, edge_count, orientation)
        }
    }

    fn zigzag(count: usize) -> Vec<Point3> {
        (0..count)
            .map(|i| Point3::new(i as f64 * 3.0, (i % 2) as f64 * 2.0, 0.0))
            .collect()
    }

    #[test]
    fn new_builds_initial_points() {
        let node = LineNode::new(&pts(&[[0.0, 0.0, 0.0], [0.0, 0.0, 10.0]]), TubeOptions::default()).unwrap();
        assert_eq!(node.snapshot().vertex_count(), 24);
        assert!((node.length() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn add_with_previous_appends_both() {
        let mut node = LineNode::new(&[], TubeOptions::default()).unwrap();
        assert!(node.add(Point3::new(1.0, 0.0, 0.0), Some(Point3::ORIGIN)));
        assert_eq!(node.points().len(), 2);
        assert!((node.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn set_points_appends_and_removes_difference() {
        let all = pts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [2.0, 1.0, 0.0]]);
        let mut node = LineNode::new(&all[..2], TubeOptions::default()).unwrap();

        node.set_points(&all);
        assert_eq!(node.points(), all.as_slice());

        node.set_points(&all[..3]);
        assert_eq!(node.points(), &all[..3]);
        assert!((node.length() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn set_points_replaces_diverging_tail() {
        let mut node = LineNode::new(&pts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]]), TubeOptions::default()).unwrap();
        let replacement = pts(&[[0.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 3.0, 4.0]]);
        node.set_points(&replacement);

        let fresh = LineNode::new(&replacement, TubeOptions::default()).unwrap();
        assert_eq!(node.snapshot(), fresh.snapshot());
    }

    #[test]
    fn growing_list_with_ignored_point_only_touches_tail() {
        let options = TubeOptions::default().with_radius(0.25);
        let path = zigzag(24);
        let mut raw = vec![path[0], path[1], path[1]];

        let bulk_section = CountingSection::default();
        let mut bulk = LineNode::with_sampler(&[], options, bulk_section.clone()).unwrap();
        bulk.set_points(&raw);

        let step_section = CountingSection::default();
        let mut stepped = LineNode::with_sampler(&[], options, step_section.clone()).unwrap();
        for &p in &raw {
            stepped.add(p, None);
        }

        for &next in &path[2..] {
            raw.push(next);
            let bulk_before = bulk_section.calls.get();
            let step_before = step_section.calls.get();

            bulk.set_points(&raw);
            stepped.add(next, None);

            assert_eq!(
                bulk_section.calls.get() - bulk_before,
                step_section.calls.get() - step_before
            );
        }
        assert_eq!(bulk.snapshot(), stepped.snapshot());
        assert_eq!(bulk.diagnostics().ignored_point_count, 1);
    }

    #[test]
    fn shrinking_list_with_ignored_points_matches_fresh_build() {
        let path = zigzag(8);
        let mut raw = path.clone();
        raw.insert(3, path[2]);
        raw.insert(1, Point3::new(f64::NAN, 0.0, 0.0));

        let mut node = LineNode::new(&raw, TubeOptions::default().with_radius(0.25)).unwrap();
        assert_eq!(node.points().len(), 8);

        node.set_points(&raw[..6]);
        let fresh = LineNode::new(&raw[..6], TubeOptions::default().with_radius(0.25)).unwrap();
        assert_eq!(node.points(), fresh.points());
        assert_eq!(node.snapshot(), fresh.snapshot());

        // same list again is a no-op, even with the non-finite entry
        let section = CountingSection::default();
        let mut counted =
            LineNode::with_sampler(&raw, TubeOptions::default(), section.clone()).unwrap();
        let before = section.calls.get();
        counted.set_points(&raw);
        assert_eq!(section.calls.get(), before);
    }

    #[test]
    fn remove_skips_ignored_inputs() {
        let a = Point3::ORIGIN;
        let b = Point3::new(2.0, 0.0, 0.0);
        let c = Point3::new(2.0, 2.0, 0.0);
        let mut node = LineNode::new(&[a, b, b], TubeOptions::default()).unwrap();

        assert_eq!(node.remove(1), 1);
        assert_eq!(node.points(), &[a]);

        node.set_points(&[a, c]);
        let fresh = LineNode::new(&[a, c], TubeOptions::default()).unwrap();
        assert_eq!(node.snapshot(), fresh.snapshot());
    }

    #[test]
    fn exact_policy_removes_requested_count() {
        let mut node = LineNode::new(
            &pts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]),
            TubeOptions::default(),
        )
        .unwrap();
        assert_eq!(node.remove(1), 1);
        assert_eq!(node.points().len(), 2);
    }

    #[test]
    fn full_clear_policy_clears_short_lines() {
        let mut node = LineNode::new(
            &pts(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [2.0, 0.0, 0.0]]),
            TubeOptions::default(),
        )
        .unwrap()
        .with_remove_policy(RemovePolicy::full_clear_below(10));

        assert_eq!(node.remove(1), 3);
        assert!(node.points().is_empty());
        assert!(node.snapshot().is_empty());
        assert!(node.length().abs() < 1e-12);
    }

    #[test]
    fn policy_count_is_clamped() {
        assert_eq!(RemovePolicy::exact().count_to_remove(5, 3), 3);
        assert_eq!(RemovePolicy::full_clear_below(10).count_to_remove(1, 12), 1);
        assert_eq!(RemovePolicy::full_clear_below(10).count_to_remove(1, 9), 9);
    }

    #[test]
    fn set_edges_refreshes_snapshot() {
        let mut node = LineNode::new(&pts(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0]]), TubeOptions::default()).unwrap();
        node.set_edges(4).unwrap();
        assert_eq!(node.snapshot().vertex_count(), 8);
        assert!(node.set_edges(2).is_err());
        assert_eq!(node.snapshot().vertex_count(), 8);
    }

    #[test]
    fn diagnostics_carry_timing_when_enabled() {
        let node = LineNode::new(&pts(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0]]), TubeOptions::default()).unwrap();
        let diagnostics = node.diagnostics();
        assert_eq!(diagnostics.timing.is_some(), node.timing().is_some());
        assert_eq!(diagnostics.vertex_count, 24);
    }
}
