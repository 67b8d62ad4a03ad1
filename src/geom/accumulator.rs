//! Incremental tube mesh.
//!
//! [`TubeMeshAccumulator`] owns the flat buffers and an arena of segment
//! records, one per accepted point once there are at least two. Each record
//! knows exactly how many vertices and indices it contributed, so undoing the
//! newest points is a tail truncation followed by one recomputation.
//!
//! The accumulator moves through four states:
//!
//! | points | segments | geometry |
//! |--------|----------|----------|
//! | 0      | 0        | none     |
//! | 1      | 0        | none (anchor only) |
//! | 2      | `First`, `Last` | two rings |
//! | n ≥ 3  | `First`, `Middle`…, `Last` | |

use super::diagnostics::TubeDiagnostics;
use super::options::{
    TubeError, TubeOptions, validate_edges, validate_max_turn_steps, validate_radius,
};
use super::section::{CircleSection, CrossSectionSampler, texture_u_row};
use super::segment::{SegmentBuilder, SegmentDelta, SegmentRole, SegmentState};
use super::snapshot::MeshSnapshot;
use super::Point3;

/// Bookkeeping for one segment's slice of the buffers.
#[derive(Debug, Clone)]
struct SegmentRecord {
    role: SegmentRole,
    vertex_count: usize,
    index_count: usize,
    ring_count: usize,
    turn_steps: usize,
    terminal: SegmentState,
}

pub struct TubeMeshAccumulator<S: CrossSectionSampler = CircleSection> {
    options: TubeOptions,
    sampler: S,
    texture_u: Vec<f64>,
    points: Vec<Point3>,
    segments: Vec<SegmentRecord>,
    vertices: Vec<[f64; 3]>,
    normals: Vec<[f64; 3]>,
    uvs: Vec<[f64; 2]>,
    indices: Vec<u32>,
    ignored_points: usize,
}

impl TubeMeshAccumulator<CircleSection> {
    pub fn new(options: TubeOptions) -> Result<Self, TubeError> {
        Self::with_sampler(options, CircleSection)
    }
}

impl<S: CrossSectionSampler> TubeMeshAccumulator<S> {
    pub fn with_sampler(options: TubeOptions, sampler: S) -> Result<Self, TubeError> {
        options.validate()?;
        let texture_u = texture_u_row(&sampler, options.radius, options.edges);
        Ok(Self {
            options,
            sampler,
            texture_u,
            points: Vec::new(),
            segments: Vec::new(),
            vertices: Vec::new(),
            normals: Vec::new(),
            uvs: Vec::new(),
            indices: Vec::new(),
            ignored_points: 0,
        })
    }

    fn builder(&self) -> SegmentBuilder<'_, S> {
        SegmentBuilder::new(&self.options, &self.sampler, &self.texture_u)
    }

    /// Adds `point` to the end of the polyline. Returns `false` (and changes
    /// nothing) when the point is non-finite or repeats the previous point.
    pub fn append(&mut self, point: Point3) -> bool {
        if !point.is_finite() {
            log::warn!("ignoring non-finite point {:?}", point.to_array());
            self.ignored_points += 1;
            return false;
        }
        if let Some(&last) = self.points.last() {
            if self.options.tolerance().approx_eq_point3(last, point) {
                log::debug!("ignoring duplicate point {:?}", point.to_array());
                self.ignored_points += 1;
                return false;
            }
        }

        let accepted = match self.points.len() {
            0 => true,
            1 => self.append_second(point),
            _ => self.append_extending(point),
        };

        if accepted {
            self.points.push(point);
            self.debug_check();
        } else {
            log::debug!("ignoring degenerate point {:?}", point.to_array());
            self.ignored_points += 1;
        }
        accepted
    }

    fn append_second(&mut self, point: Point3) -> bool {
        let anchor = self.points[0];
        let deltas = {
            let builder = self.builder();
            builder.first(anchor, point).and_then(|first| {
                let offset = first.vertices.len() as u32;
                let last = builder.last(point, &first.terminal, offset)?;
                Some((first, last))
            })
        };
        let Some((first, last)) = deltas else {
            return false;
        };
        self.push_segment(first);
        self.push_segment(last);
        true
    }

    fn append_extending(&mut self, point: Point3) -> bool {
        let count = self.segments.len();
        let deltas = {
            let builder = self.builder();
            let previous = &self.segments[count - 2].terminal;
            let current = &self.segments[count - 1];
            let offset = (self.vertices.len() - current.vertex_count) as u32;
            builder
                .middle(current.terminal.point, previous, point, offset)
                .and_then(|middle| {
                    let next_offset = offset + middle.vertices.len() as u32;
                    let last = builder.last(point, &middle.terminal, next_offset)?;
                    Some((middle, last))
                })
        };
        let Some((middle, last)) = deltas else {
            return false;
        };
        self.pop_segment();
        self.push_segment(middle);
        self.push_segment(last);
        true
    }

    /// Removes up to `n` points from the end. Returns how many were removed.
    pub fn remove_last(&mut self, n: usize) -> usize {
        let mut removed = 0;
        while removed < n && !self.points.is_empty() {
            self.remove_one();
            removed += 1;
        }
        if removed > 0 {
            self.debug_check();
        }
        removed
    }

    fn remove_one(&mut self) {
        match self.points.len() {
            0 => {}
            1 => {
                self.points.clear();
            }
            2 => {
                self.points.pop();
                self.clear_geometry();
            }
            _ => {
                self.points.pop();
                self.pop_segment();
                let Some(trailing) = self.pop_segment() else {
                    return;
                };
                let rebuilt = {
                    let previous = self.segments.last().map(|s| &s.terminal);
                    previous.and_then(|previous| {
                        self.builder()
                            .last(trailing.terminal.point, previous, self.vertices.len() as u32)
                    })
                };
                match rebuilt {
                    Some(delta) => self.push_segment(delta),
                    // The same point was accepted against the same predecessor before.
                    None => {
                        log::warn!("could not rebuild trailing segment; rebuilding tube");
                        self.rebuild();
                    }
                }
            }
        }
    }

    fn push_segment(&mut self, delta: SegmentDelta) {
        self.segments.push(SegmentRecord {
            role: delta.role,
            vertex_count: delta.vertices.len(),
            index_count: delta.indices.len(),
            ring_count: delta.ring_count,
            turn_steps: delta.turn_steps,
            terminal: delta.terminal,
        });
        self.vertices.extend(delta.vertices);
        self.normals.extend(delta.normals);
        self.uvs.extend(delta.uvs);
        self.indices.extend(delta.indices);
    }

    fn pop_segment(&mut self) -> Option<SegmentRecord> {
        let record = self.segments.pop()?;
        let keep_vertices = self.vertices.len().saturating_sub(record.vertex_count);
        let keep_indices = self.indices.len().saturating_sub(record.index_count);
        self.vertices.truncate(keep_vertices);
        self.normals.truncate(keep_vertices);
        self.uvs.truncate(keep_vertices);
        self.indices.truncate(keep_indices);
        Some(record)
    }

    fn clear_geometry(&mut self) {
        self.segments.clear();
        self.vertices.clear();
        self.normals.clear();
        self.uvs.clear();
        self.indices.clear();
    }

    /// Drops all points and geometry, and resets the ignored-point counter.
    pub fn clear(&mut self) {
        self.points.clear();
        self.clear_geometry();
        self.ignored_points = 0;
    }

    /// Recomputes every segment from the retained points with the current options.
    pub fn rebuild(&mut self) {
        let points = std::mem::take(&mut self.points);
        let ignored = self.ignored_points;
        self.clear_geometry();
        for point in points {
            self.append(point);
        }
        // Retained points were already counted when first rejected or accepted.
        self.ignored_points = ignored;
        log::debug!(
            "rebuilt tube: {} points, {} vertices",
            self.points.len(),
            self.vertices.len()
        );
    }

    /// Applies to segments built from now on; existing rings keep their radius.
    pub fn set_radius(&mut self, radius: f64) -> Result<(), TubeError> {
        validate_radius(radius)?;
        self.options.radius = radius;
        Ok(())
    }

    /// Changes ring topology, so the whole tube is rebuilt.
    pub fn set_edge_count(&mut self, edges: usize) -> Result<(), TubeError> {
        validate_edges(edges)?;
        if edges != self.options.edges {
            self.options.edges = edges;
            self.texture_u = texture_u_row(&self.sampler, self.options.radius, edges);
            self.rebuild();
        }
        Ok(())
    }

    pub fn set_max_turn_steps(&mut self, max_turn_steps: usize) -> Result<(), TubeError> {
        validate_max_turn_steps(max_turn_steps)?;
        if max_turn_steps != self.options.max_turn_steps {
            self.options.max_turn_steps = max_turn_steps;
            self.rebuild();
        }
        Ok(())
    }

    /// Replaces all options. Rebuilds unless only the radius changed.
    pub fn set_options(&mut self, options: TubeOptions) -> Result<(), TubeError> {
        options.validate()?;
        let topology_changed = TubeOptions {
            radius: self.options.radius,
            ..options
        } != self.options;
        self.options = options;
        if topology_changed {
            self.texture_u = texture_u_row(&self.sampler, options.radius, options.edges);
            self.rebuild();
        }
        Ok(())
    }

    #[must_use]
    pub fn options(&self) -> &TubeOptions {
        &self.options
    }

    #[must_use]
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    #[must_use]
    pub fn snapshot(&self) -> MeshSnapshot {
        MeshSnapshot {
            vertices: self.vertices.clone(),
            normals: self.normals.clone(),
            uvs: self.uvs.clone(),
            indices: self.indices.clone(),
            arc_length: self.arc_length(),
        }
    }

    #[must_use]
    pub fn vertices(&self) -> &[[f64; 3]] {
        &self.vertices
    }

    #[must_use]
    pub fn normals(&self) -> &[[f64; 3]] {
        &self.normals
    }

    #[must_use]
    pub fn uvs(&self) -> &[[f64; 2]] {
        &self.uvs
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Accepted points, anchor first.
    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[must_use]
    pub fn segment_roles(&self) -> Vec<SegmentRole> {
        self.segments.iter().map(|s| s.role).collect()
    }

    #[must_use]
    pub fn arc_length(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.terminal.arc_length)
    }

    #[must_use]
    pub fn diagnostics(&self) -> TubeDiagnostics {
        let mut diagnostics = TubeDiagnostics {
            point_count: self.points.len(),
            segment_count: self.segments.len(),
            ring_count: self.segments.iter().map(|s| s.ring_count).sum(),
            vertex_count: self.vertices.len(),
            triangle_count: self.indices.len() / 3,
            smoothed_turn_count: self.segments.iter().filter(|s| s.turn_steps > 1).count(),
            max_turn_steps_used: self.segments.iter().map(|s| s.turn_steps).max().unwrap_or(0),
            ignored_point_count: self.ignored_points,
            arc_length: self.arc_length(),
            ..TubeDiagnostics::default()
        };
        if self.ignored_points > 0 {
            diagnostics.add_warning(format!("{} points ignored", self.ignored_points));
        }
        diagnostics
    }

    fn debug_check(&self) {
        debug_assert_eq!(self.vertices.len(), self.normals.len());
        debug_assert_eq!(self.vertices.len(), self.uvs.len());
        debug_assert_eq!(self.indices.len() % 3, 0);
        debug_assert!(
            self.indices.iter().all(|&i| (i as usize) < self.vertices.len()),
            "index out of range"
        );
        debug_assert_eq!(
            self.segments.iter().map(|s| s.vertex_count).sum::<usize>(),
            self.vertices.len()
        );
        debug_assert!(self.segments.is_empty() || self.segments.len() == self.points.len());
    }
}

impl<S: CrossSectionSampler + std::fmt::Debug> std::fmt::Debug for TubeMeshAccumulator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TubeMeshAccumulator")
            .field("options", &self.options)
            .field("sampler", &self.sampler)
            .field("points", &self.points.len())
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .field("arc_length", &self.arc_length())
            .finish()
    }
}
