//! Opt-in timing hooks for tube edits.
//!
//! Timing is collected only when the `tube_metrics` feature is enabled and the
//! target is not WASM (`std::time::Instant` is unavailable there). Otherwise
//! every call compiles down to invoking the closure.
//!
//! ```ignore
//! use tube_line::geom::{TimingBucket, TubeMetrics};
//!
//! let mut metrics = TubeMetrics::default();
//! metrics.begin();
//! let accepted = metrics.time(TimingBucket::Append, || accumulator.append(p));
//! if let Some(report) = metrics.end() {
//!     println!("append: {} ns", report.append_ns);
//! }
//! ```

/// Categories for timing tube edits. Each bucket accumulates across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Appending points (including recomputing the trailing segment).
    Append,
    /// Removing points from the tail.
    Remove,
    /// Full rebuilds after topology changes.
    Rebuild,
    /// Copying buffers into a snapshot.
    Snapshot,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TubeTimingReport {
    pub append_ns: u64,
    pub remove_ns: u64,
    pub rebuild_ns: u64,
    pub snapshot_ns: u64,
}

impl TubeTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.append_ns
            .saturating_add(self.remove_ns)
            .saturating_add(self.rebuild_ns)
            .saturating_add(self.snapshot_ns)
    }

    /// Total time in milliseconds, for display.
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing tube edits.
///
/// When the `tube_metrics` feature is disabled (or on WASM) every method is a
/// no-op and [`end`](Self::end) returns `None`.
#[derive(Debug, Default, Clone)]
pub struct TubeMetrics {
    #[cfg(all(feature = "tube_metrics", not(target_arch = "wasm32")))]
    report: TubeTimingReport,
}

impl TubeMetrics {
    /// Resets all counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "tube_metrics", not(target_arch = "wasm32")))]
        {
            self.report = TubeTimingReport::default();
        }
    }

    /// Accumulated report, or `None` when metrics are compiled out.
    #[must_use]
    pub fn end(&self) -> Option<TubeTimingReport> {
        #[cfg(all(feature = "tube_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "tube_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f` and adds its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "tube_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "tube_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "tube_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::Append => &mut self.report.append_ns,
            TimingBucket::Remove => &mut self.report.remove_ns,
            TimingBucket::Rebuild => &mut self.report.rebuild_ns,
            TimingBucket::Snapshot => &mut self.report.snapshot_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_report_total() {
        let report = TubeTimingReport {
            append_ns: 1000,
            remove_ns: 2000,
            rebuild_ns: 3000,
            snapshot_ns: 0,
        };
        assert_eq!(report.total_ns(), 6000);
        assert!((report.total_ms() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn test_total_saturates() {
        let report = TubeTimingReport {
            append_ns: u64::MAX,
            remove_ns: 1,
            ..TubeTimingReport::default()
        };
        assert_eq!(report.total_ns(), u64::MAX);
    }

    #[test]
    fn test_time_returns_closure_result() {
        let mut metrics = TubeMetrics::default();
        metrics.begin();
        let result = metrics.time(TimingBucket::Append, || 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_end_matches_feature() {
        let mut metrics = TubeMetrics::default();
        metrics.begin();
        metrics.time(TimingBucket::Snapshot, || ());
        let report = metrics.end();
        if cfg!(all(feature = "tube_metrics", not(target_arch = "wasm32"))) {
            assert!(report.is_some());
        } else {
            assert!(report.is_none());
        }
    }
}
