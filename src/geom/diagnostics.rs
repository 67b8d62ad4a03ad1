//! Diagnostics for the tube accumulator.
//!
//! Counts describe the current state of the mesh, not the history of edits,
//! except `ignored_point_count` which accumulates every rejected input point
//! since construction (or the last [`clear`](super::TubeMeshAccumulator::clear)).
//!
//! ```ignore
//! let diagnostics = accumulator.diagnostics();
//! log::debug!("tube {}", diagnostics.summary());
//! if diagnostics.ignored_point_count > 0 {
//!     eprintln!("{} duplicate or non-finite points skipped", diagnostics.ignored_point_count);
//! }
//! ```

use std::fmt;

use super::metrics::TubeTimingReport;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TubeDiagnostics {
    /// Accepted polyline points, including the anchor.
    pub point_count: usize,

    /// Segments currently in the arena (0 or `point_count`).
    pub segment_count: usize,

    /// Rings emitted across all segments.
    pub ring_count: usize,

    pub vertex_count: usize,

    pub triangle_count: usize,

    /// Corners rounded with more than one ring.
    pub smoothed_turn_count: usize,

    /// Largest number of rings any single corner used.
    pub max_turn_steps_used: usize,

    /// Points rejected as duplicates of their predecessor or as non-finite.
    pub ignored_point_count: usize,

    /// Total arc length of the tube axis.
    pub arc_length: f64,

    /// Only populated when the `tube_metrics` feature is enabled and the
    /// target is not WASM.
    pub timing: Option<TubeTimingReport>,

    /// Human-readable notes, e.g. "2 points ignored".
    pub warnings: Vec<String>,
}

impl TubeDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when there is no geometry (fewer than two points).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertex_count == 0
    }

    /// Returns `true` if every input point was accepted and nothing was flagged.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.ignored_point_count == 0 && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Short one-line summary for logging.
    ///
    /// Format: `"P:{points} R:{rings} V:{vertices} T:{triangles} L:{length} [extras...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "P:{} R:{} V:{} T:{} L:{:.3}",
            self.point_count, self.ring_count, self.vertex_count, self.triangle_count, self.arc_length
        )];

        if self.smoothed_turn_count > 0 {
            parts.push(format!(
                "turns:{} (max {} rings)",
                self.smoothed_turn_count, self.max_turn_steps_used
            ));
        }
        if self.ignored_point_count > 0 {
            parts.push(format!("ignored:{}", self.ignored_point_count));
        }

        parts.join(" ")
    }
}

impl fmt::Display for TubeDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tube Diagnostics:")?;
        writeln!(f, "  Points: {}", self.point_count)?;
        writeln!(f, "  Segments: {}", self.segment_count)?;
        writeln!(f, "  Rings: {}", self.ring_count)?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Arc length: {:.6}", self.arc_length)?;

        if self.smoothed_turn_count > 0 {
            writeln!(
                f,
                "  Smoothed turns: {} (max {} rings)",
                self.smoothed_turn_count, self.max_turn_steps_used
            )?;
        }
        if self.ignored_point_count > 0 {
            writeln!(f, "  Ignored points: {}", self.ignored_point_count)?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        let status = if self.is_empty() {
            "EMPTY"
        } else if self.is_clean() {
            "CLEAN"
        } else {
            "INPUT SKIPPED"
        };
        writeln!(f, "  Status: {status}")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty_and_clean() {
        let diag = TubeDiagnostics::default();
        assert!(diag.is_empty());
        assert!(diag.is_clean());
        assert!(!diag.has_warnings());
    }

    #[test]
    fn test_ignored_points_not_clean() {
        let diag = TubeDiagnostics {
            vertex_count: 24,
            ignored_point_count: 1,
            ..Default::default()
        };
        assert!(!diag.is_empty());
        assert!(!diag.is_clean());
    }

    #[test]
    fn test_summary() {
        let diag = TubeDiagnostics {
            point_count: 3,
            ring_count: 6,
            vertex_count: 72,
            triangle_count: 120,
            smoothed_turn_count: 1,
            max_turn_steps_used: 4,
            ignored_point_count: 2,
            arc_length: 12.5,
            ..Default::default()
        };

        let summary = diag.summary();
        assert!(summary.contains("P:3"));
        assert!(summary.contains("V:72"));
        assert!(summary.contains("L:12.500"));
        assert!(summary.contains("turns:1 (max 4 rings)"));
        assert!(summary.contains("ignored:2"));
    }

    #[test]
    fn test_display() {
        let mut diag = TubeDiagnostics {
            point_count: 2,
            vertex_count: 24,
            triangle_count: 24,
            ..Default::default()
        };
        diag.add_warning("test warning");

        let output = format!("{diag}");
        assert!(output.contains("Vertices: 24"));
        assert!(output.contains("Triangles: 24"));
        assert!(output.contains("test warning"));
        assert!(output.contains("INPUT SKIPPED"));
    }
}
