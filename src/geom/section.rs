//! Circular cross-sections for the tube.
//!
//! A sampler returns one ring of points around the origin. The canonical ring
//! lies in the XZ plane, i.e. perpendicular to [`SECTION_AXIS`]; an orientation
//! rotates that plane so the ring faces `orientation * SECTION_AXIS`.

use super::{Quat, Vec3};

/// Direction the canonical ring faces before any orientation is applied.
pub const SECTION_AXIS: Vec3 = Vec3::Y;

/// Produces the ordered ring of points for one cross-section.
///
/// Implementations must be pure: the same arguments always give the same ring,
/// and the ring always has exactly `edge_count` points.
pub trait CrossSectionSampler {
    fn sample(&self, radius: f64, edge_count: usize, orientation: Option<Quat>) -> Vec<Vec3>;
}

/// Evenly spaced points on a circle, starting at `+X` and turning toward `+Z`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CircleSection;

impl CrossSectionSampler for CircleSection {
    fn sample(&self, radius: f64, edge_count: usize, orientation: Option<Quat>) -> Vec<Vec3> {
        let step = 2.0 * std::f64::consts::PI / edge_count.max(1) as f64;
        (0..edge_count)
            .map(|i| {
                let angle = step * i as f64;
                let local = Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin());
                match orientation {
                    Some(q) => q.rotate(local),
                    None => local,
                }
            })
            .collect()
    }
}

/// U texture coordinate for each ring slot: `i / (n - 1)`.
///
/// Derived from the unoriented ring so every ring shares the same row.
#[must_use]
pub fn texture_u_row(sampler: &impl CrossSectionSampler, radius: f64, edge_count: usize) -> Vec<f64> {
    let count = sampler.sample(radius, edge_count, None).len();
    let denom = count.saturating_sub(1).max(1) as f64;
    (0..count).map(|i| i as f64 / denom).collect()
}
