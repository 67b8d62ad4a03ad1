//! Per-point tube segments.
//!
//! A segment is everything one polyline point adds to the tube: one ring for a
//! plain joint, several rings for a smoothed corner, plus the index bands that
//! stitch them to the ring before. Building a segment needs only the terminal
//! [`SegmentState`] of its predecessor, never the accumulated buffers, so the
//! result is a self-contained [`SegmentDelta`] the accumulator can append or
//! pop as a unit.

use std::f64::consts::PI;

use super::section::{CrossSectionSampler, SECTION_AXIS};
use super::{Point3, Quat, TubeOptions, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentRole {
    /// The anchor: one ring, no triangles.
    First,
    /// Has both neighbours; its rings bisect the incoming and outgoing directions.
    Middle,
    /// Newest point; oriented from the incoming direction only.
    Last,
}

/// What a segment leaves behind for the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentState {
    /// Polyline point that produced the segment.
    pub point: Point3,
    /// Centre of the last ring emitted. Differs from `point` after a smoothed turn.
    pub location: Point3,
    /// Direction the reference ring faces.
    pub forward: Vec3,
    /// Ring in local space, perpendicular to `forward`.
    pub reference_ring: Vec<Vec3>,
    /// Running arc length of the whole tube up to `location`.
    pub arc_length: f64,
}

/// Buffer contribution of one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentDelta {
    pub role: SegmentRole,
    pub vertices: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    pub uvs: Vec<[f64; 2]>,
    /// Absolute indices into the accumulated vertex buffer.
    pub indices: Vec<u32>,
    pub ring_count: usize,
    /// Rings spent on the corner; 1 unless the corner was smoothed.
    pub turn_steps: usize,
    /// Arc length added by this segment alone.
    pub length: f64,
    pub terminal: SegmentState,
}

/// Number of rings used to round a corner of `turn_angle` radians.
#[must_use]
pub fn turn_steps_for(turn_angle: f64, max_turn_steps: usize) -> usize {
    let fraction = (turn_angle.clamp(0.0, PI) / PI).min(1.0);
    let steps = (fraction * max_turn_steps as f64).round();
    (steps as usize).max(1)
}

/// Appends the two triangles per edge joining the ring at `ring_start` to the
/// ring directly before it. Winding faces away from the tube axis.
pub fn push_ring_band(indices: &mut Vec<u32>, ring_start: u32, edge_count: u32) {
    let Some(prev) = ring_start.checked_sub(edge_count) else {
        return;
    };
    for i in 0..edge_count {
        let j = (i + 1) % edge_count;
        indices.extend_from_slice(&[
            ring_start + j,
            prev + j,
            prev + i,
            prev + i,
            ring_start + i,
            ring_start + j,
        ]);
    }
}

fn rotate_ring(ring: &[Vec3], rotation: Quat) -> Vec<Vec3> {
    ring.iter().map(|p| rotation.rotate(*p)).collect()
}

/// Collects rings for one delta.
struct RingWriter<'a> {
    texture_u: &'a [f64],
    vertex_offset: u32,
    vertices: Vec<[f64; 3]>,
    normals: Vec<[f64; 3]>,
    uvs: Vec<[f64; 2]>,
    indices: Vec<u32>,
    ring_count: usize,
}

impl<'a> RingWriter<'a> {
    fn new(texture_u: &'a [f64], vertex_offset: u32) -> Self {
        Self {
            texture_u,
            vertex_offset,
            vertices: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
            ring_count: 0,
        }
    }

    fn push_ring(&mut self, ring: &[Vec3], center: Point3, v: f64, connect: bool) {
        let ring_start = self.vertex_offset + self.vertices.len() as u32;
        for (slot, p) in ring.iter().enumerate() {
            self.vertices.push(center.add_vec(*p).to_array());
            self.normals.push(p.normalized().unwrap_or(SECTION_AXIS).to_array());
            let u = self.texture_u.get(slot).copied().unwrap_or(0.0);
            self.uvs.push([u, v]);
        }
        if connect {
            push_ring_band(&mut self.indices, ring_start, ring.len() as u32);
        }
        self.ring_count += 1;
    }

    fn finish(self, role: SegmentRole, turn_steps: usize, length: f64, terminal: SegmentState) -> SegmentDelta {
        SegmentDelta {
            role,
            vertices: self.vertices,
            normals: self.normals,
            uvs: self.uvs,
            indices: self.indices,
            ring_count: self.ring_count,
            turn_steps,
            length,
            terminal,
        }
    }
}

/// Computes segment deltas. Holds no state of its own.
pub struct SegmentBuilder<'a, S: CrossSectionSampler + ?Sized> {
    options: &'a TubeOptions,
    sampler: &'a S,
    texture_u: &'a [f64],
}

impl<'a, S: CrossSectionSampler + ?Sized> SegmentBuilder<'a, S> {
    #[must_use]
    pub fn new(options: &'a TubeOptions, sampler: &'a S, texture_u: &'a [f64]) -> Self {
        Self {
            options,
            sampler,
            texture_u,
        }
    }

    /// Anchor ring at `anchor`, facing `next`. Always lands at vertex 0.
    ///
    /// `None` when the two points coincide.
    #[must_use]
    pub fn first(&self, anchor: Point3, next: Point3) -> Option<SegmentDelta> {
        if self.options.tolerance().approx_eq_point3(anchor, next) {
            return None;
        }
        let forward = next.sub_point(anchor).normalized()?;
        let orientation = Quat::rotation_between(SECTION_AXIS, forward, Vec3::X)?;
        let ring = self
            .sampler
            .sample(self.options.radius, self.options.edges, Some(orientation));

        let mut writer = RingWriter::new(self.texture_u, 0);
        writer.push_ring(&ring, anchor, 0.0, false);

        let terminal = SegmentState {
            point: anchor,
            location: anchor,
            forward,
            reference_ring: ring,
            arc_length: 0.0,
        };
        Some(writer.finish(SegmentRole::First, 1, 0.0, terminal))
    }

    /// Segment for a point that has a successor at `next`.
    #[must_use]
    pub fn middle(
        &self,
        point: Point3,
        previous: &SegmentState,
        next: Point3,
        vertex_offset: u32,
    ) -> Option<SegmentDelta> {
        let tol = self.options.tolerance();
        let outgoing = if tol.approx_eq_point3(next, point) {
            None
        } else {
            next.sub_point(point).normalized()
        };
        self.follow(SegmentRole::Middle, point, previous, outgoing, vertex_offset)
    }

    /// Segment for the newest point.
    #[must_use]
    pub fn last(&self, point: Point3, previous: &SegmentState, vertex_offset: u32) -> Option<SegmentDelta> {
        self.follow(SegmentRole::Last, point, previous, None, vertex_offset)
    }

    fn follow(
        &self,
        role: SegmentRole,
        point: Point3,
        previous: &SegmentState,
        outgoing: Option<Vec3>,
        vertex_offset: u32,
    ) -> Option<SegmentDelta> {
        let radius = self.options.radius;
        if self.options.tolerance().approx_eq_point3(point, previous.point) {
            return None;
        }
        let incoming = point.sub_point(previous.point).normalized()?;
        let target = outgoing.unwrap_or(incoming);

        let reference = self.conform_ring(&previous.reference_ring, previous.forward);
        let fallback_axis = reference.first().copied().unwrap_or(Vec3::X);
        let rotation = Quat::rotation_between(previous.forward, target, fallback_axis)?;
        let turn_angle = rotation.angle().clamp(0.0, PI);

        let segment_length = point.distance_to(previous.point);
        let turn_steps = if segment_length > self.options.turn_trigger_distance() {
            turn_steps_for(turn_angle, self.options.max_turn_steps)
        } else {
            1
        };

        let mut writer = RingWriter::new(self.texture_u, vertex_offset);
        let mut location = previous.location;
        let mut arc_length = previous.arc_length;
        let half = rotation.split(2.0);

        if turn_steps > 1 {
            // Ring centres spread along the bisector, symmetric about the corner.
            let bisector = half.rotate(previous.forward).normalized().unwrap_or(incoming);
            let step = rotation.split(turn_steps as f64);
            let mut orientation = Quat::IDENTITY;
            for i in 0..turn_steps {
                let progress = i as f64 / (turn_steps - 1) as f64 - 0.5;
                let center = point.add_vec(bisector.mul_scalar(radius * progress));
                arc_length += location.distance_to(center);
                location = center;
                writer.push_ring(&rotate_ring(&reference, orientation), center, arc_length, true);
                orientation = step * orientation;
            }
            log::debug!(
                "smoothed {:.3} rad turn with {turn_steps} rings at ({:.3}, {:.3}, {:.3})",
                turn_angle,
                point.x,
                point.y,
                point.z
            );
        } else {
            arc_length += location.distance_to(point);
            location = point;
            writer.push_ring(&rotate_ring(&reference, half), point, arc_length, true);
        }

        let terminal = SegmentState {
            point,
            location,
            forward: target,
            reference_ring: rotate_ring(&reference, rotation),
            arc_length,
        };
        let length = arc_length - previous.arc_length;
        Some(writer.finish(role, turn_steps, length, terminal))
    }

    /// Projects the carried ring back onto the plane perpendicular to `forward`
    /// at the current radius. Removes accumulated rotation drift and applies a
    /// radius change to every ring built from here on.
    fn conform_ring(&self, ring: &[Vec3], forward: Vec3) -> Vec<Vec3> {
        let radius = self.options.radius;
        ring.iter()
            .map(|p| {
                let planar = p.sub(forward.mul_scalar(p.dot(forward)));
                planar.with_length(radius).unwrap_or(*p)
            })
            .collect()
    }
}
