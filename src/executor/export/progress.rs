//! Progress tracking for export operations
//!
//! Cursor exports do not know the result size up front, so progress is a
//! spinner with a running triple count and throughput, refreshed as the
//! consumer commits batches.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};

/// Progress tracker for export operations
pub struct ProgressTracker {
    /// Number of triples committed so far
    processed: AtomicU64,
    /// Start time of the operation
    start_time: Instant,
    /// Progress spinner (optional, disabled for quiet runs)
    bar: Option<ProgressBar>,
}

impl ProgressTracker {
    /// Create a tracker; `enable_bar` controls the terminal spinner
    pub fn new(enable_bar: bool) -> Self {
        let bar = if enable_bar {
            let bar = ProgressBar::new_spinner();
            if let Ok(style) =
                ProgressStyle::default_spinner().template("{spinner:.green} {pos} triples {msg}")
            {
                bar.set_style(style);
            }
            Some(bar)
        } else {
            None
        };

        Self {
            processed: AtomicU64::new(0),
            start_time: Instant::now(),
            bar,
        }
    }

    /// Update the running triple count
    pub fn update(&self, count: u64) {
        self.processed.store(count, Ordering::Relaxed);

        if let Some(ref bar) = self.bar {
            bar.set_position(count);

            let elapsed = self.start_time.elapsed().as_secs_f64();
            if elapsed > 0.0 {
                let speed = count as f64 / elapsed;
                bar.set_message(format!("({speed:.0} triples/sec)"));
            }
        }
    }

    /// Finish and clear the spinner
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_without_bar() {
        let tracker = ProgressTracker::new(false);
        tracker.update(500);
        tracker.finish();
        assert_eq!(tracker.processed.load(Ordering::Relaxed), 500);
    }
}
