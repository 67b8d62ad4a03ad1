mod accumulator;
mod core;
mod diagnostics;
mod metrics;
mod options;
mod section;
mod segment;
mod snapshot;

pub use accumulator::TubeMeshAccumulator;
pub use core::{BBox, Point3, Quat, Tolerance, Vec3};
pub use diagnostics::TubeDiagnostics;
pub use metrics::{TimingBucket, TubeMetrics, TubeTimingReport};
pub use options::{MAX_TURN_STEPS, MIN_EDGES, TubeError, TubeOptions};
pub use section::{CircleSection, CrossSectionSampler, SECTION_AXIS, texture_u_row};
pub use segment::{
    SegmentBuilder, SegmentDelta, SegmentRole, SegmentState,
    push_ring_band, turn_steps_for,
};
pub use snapshot::MeshSnapshot;
