//! Layout statistics for debugging and performance analysis.
//!
//! Enable with the `layout-stats` feature:
//! ```bash
//! cargo test --features layout-stats
//! ```
//!
//! Once per second of frames the counters are logged at `info` level:
//! - layout calls made by parents
//! - calls skipped because the child was clean and got equal constraints
//! - calls executed, split by why the node was not skipped

/// Why a layout ran instead of reusing the cached result.
#[derive(Default, Clone, Copy, Debug)]
pub struct LayoutReasons {
    pub constraints_changed: bool,
    pub marked_dirty: bool,
}

#[cfg(feature = "layout-stats")]
mod inner {
    use super::LayoutReasons;
    use std::cell::RefCell;
    use std::time::Instant;

    thread_local! {
        static STATS: RefCell<LayoutStats> = RefCell::new(LayoutStats::new());
    }

    struct LayoutStats {
        total_calls: u64,
        skipped: u64,
        executed: u64,
        constraints_changed: u64,
        marked_dirty: u64,
        last_report: Instant,
        frames: u64,
    }

    impl LayoutStats {
        fn new() -> Self {
            Self {
                total_calls: 0,
                skipped: 0,
                executed: 0,
                constraints_changed: 0,
                marked_dirty: 0,
                last_report: Instant::now(),
                frames: 0,
            }
        }

        fn reset(&mut self) {
            *self = Self::new();
        }
    }

    #[inline]
    pub fn record_layout_skipped() {
        STATS.with(|s| {
            let mut stats = s.borrow_mut();
            stats.total_calls += 1;
            stats.skipped += 1;
        });
    }

    /// Counts an executed layout under its primary reason.
    #[inline]
    pub fn record_layout_executed(reasons: LayoutReasons) {
        STATS.with(|s| {
            let mut stats = s.borrow_mut();
            stats.total_calls += 1;
            stats.executed += 1;
            if reasons.constraints_changed {
                stats.constraints_changed += 1;
            } else if reasons.marked_dirty {
                stats.marked_dirty += 1;
            }
        });
    }

    pub fn end_frame() {
        STATS.with(|s| {
            let mut stats = s.borrow_mut();
            stats.frames += 1;
            if stats.last_report.elapsed().as_secs() < 1 {
                return;
            }

            let skip_rate = if stats.total_calls > 0 {
                (stats.skipped as f64 / stats.total_calls as f64) * 100.0
            } else {
                0.0
            };
            log::info!(
                "layout stats: frames={} calls={} skipped={} executed={} skip_rate={:.1}% (constraints={} dirty={})",
                stats.frames,
                stats.total_calls,
                stats.skipped,
                stats.executed,
                skip_rate,
                stats.constraints_changed,
                stats.marked_dirty,
            );
            stats.reset();
        });
    }
}

#[cfg(feature = "layout-stats")]
pub use inner::*;

#[cfg(not(feature = "layout-stats"))]
#[inline(always)]
pub fn record_layout_skipped() {}

#[cfg(not(feature = "layout-stats"))]
#[inline(always)]
pub fn record_layout_executed(_reasons: LayoutReasons) {}

#[cfg(not(feature = "layout-stats"))]
#[inline(always)]
pub fn end_frame() {}
