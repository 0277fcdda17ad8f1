use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A snapshot of coordinator metrics at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub submissions: u64,
    pub direct_admissions: u64,
    pub queued_submissions: u64,
    pub cancelled_submissions: u64,
    pub rejected_submissions: u64,
    pub batches_written: u64,
    pub items_written: u64,
    pub write_failures: u64,
    pub items_failed: u64,
    pub callback_failures: u64,
    pub largest_batch: u64,
    pub avg_batch_size: f64,
    pub avg_write_time_us: u64,
    pub batch_size_p50: u64,
    pub batch_size_p99: u64,
    pub write_p50_us: u64,
    pub write_p95_us: u64,
    pub write_p99_us: u64,
    pub last_batch_failed: bool,
    pub last_batch_secs: Option<u64>,
}

impl MetricsSnapshot {
    /// Sink calls saved by batching, as submissions per written batch.
    pub fn coalescing_ratio(&self) -> f64 {
        if self.batches_written == 0 {
            return 0.0;
        }
        (self.items_written + self.items_failed) as f64 / self.batches_written as f64
    }
}

pub(crate) fn calculate_percentile(values: &VecDeque<u64>, percentile: u8) -> u64 {
    if values.is_empty() {
        return 0;
    }

    let mut sorted: Vec<_> = values.iter().copied().collect();
    sorted.sort_unstable();

    let index = ((percentile as f64 / 100.0) * (sorted.len() as f64 - 1.0)).round() as usize;
    sorted[index.min(sorted.len() - 1)]
}
