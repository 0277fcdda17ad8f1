//! Metrics and observability for the coordinator.
//!
//! This module provides runtime counters and health information about batch
//! formation, sink writes, and callback notification.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

pub mod health;
pub mod snapshot;

pub use health::{HealthState, HealthStatus};
pub use snapshot::MetricsSnapshot;

const RECENT_WINDOW: usize = 100;

/// Coordinator-wide metrics collected at runtime.
///
/// Metrics are thread-safe and can be accessed concurrently.
/// All counters are monotonically increasing.
#[derive(Debug, Clone)]
pub struct CoordinatorMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    submissions: AtomicU64,
    direct_admissions: AtomicU64,
    queued_submissions: AtomicU64,
    cancelled_submissions: AtomicU64,
    rejected_submissions: AtomicU64,
    batches_written: AtomicU64,
    items_written: AtomicU64,
    write_failures: AtomicU64,
    items_failed: AtomicU64,
    callback_failures: AtomicU64,
    largest_batch: AtomicU64,
    total_write_time_us: AtomicU64,
    recent_batches: RwLock<RecentBatches>,
}

#[derive(Debug, Default)]
struct RecentBatches {
    last_100_sizes: VecDeque<u64>,
    last_100_write_times_us: VecDeque<u64>,
    last_batch_failed: bool,
    last_batch_timestamp: Option<Instant>,
}

impl CoordinatorMetrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                submissions: AtomicU64::new(0),
                direct_admissions: AtomicU64::new(0),
                queued_submissions: AtomicU64::new(0),
                cancelled_submissions: AtomicU64::new(0),
                rejected_submissions: AtomicU64::new(0),
                batches_written: AtomicU64::new(0),
                items_written: AtomicU64::new(0),
                write_failures: AtomicU64::new(0),
                items_failed: AtomicU64::new(0),
                callback_failures: AtomicU64::new(0),
                largest_batch: AtomicU64::new(0),
                total_write_time_us: AtomicU64::new(0),
                recent_batches: RwLock::new(RecentBatches::default()),
            }),
        }
    }

    pub fn record_submission(&self, admitted_directly: bool) {
        self.inner.submissions.fetch_add(1, Ordering::Relaxed);
        if admitted_directly {
            self.inner.direct_admissions.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner.queued_submissions.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_cancelled(&self) {
        self.inner
            .cancelled_submissions
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.inner
            .rejected_submissions
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch(&self, batch_len: usize, duration: Duration, succeeded: bool) {
        let batch_len = batch_len as u64;
        self.inner.batches_written.fetch_add(1, Ordering::Relaxed);
        if succeeded {
            self.inner
                .items_written
                .fetch_add(batch_len, Ordering::Relaxed);
        } else {
            self.inner.write_failures.fetch_add(1, Ordering::Relaxed);
            self.inner
                .items_failed
                .fetch_add(batch_len, Ordering::Relaxed);
        }
        self.inner
            .largest_batch
            .fetch_max(batch_len, Ordering::Relaxed);

        let duration_us = duration.as_micros() as u64;
        self.inner
            .total_write_time_us
            .fetch_add(duration_us, Ordering::Relaxed);

        let mut recent = self.inner.recent_batches.write();
        recent.last_batch_timestamp = Some(Instant::now());
        recent.last_batch_failed = !succeeded;
        if recent.last_100_sizes.len() >= RECENT_WINDOW {
            recent.last_100_sizes.pop_front();
        }
        recent.last_100_sizes.push_back(batch_len);
        if recent.last_100_write_times_us.len() >= RECENT_WINDOW {
            recent.last_100_write_times_us.pop_front();
        }
        recent.last_100_write_times_us.push_back(duration_us);
    }

    pub fn record_callback_failure(&self) {
        self.inner.callback_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let submissions = self.inner.submissions.load(Ordering::Relaxed);
        let direct_admissions = self.inner.direct_admissions.load(Ordering::Relaxed);
        let queued_submissions = self.inner.queued_submissions.load(Ordering::Relaxed);
        let cancelled_submissions = self.inner.cancelled_submissions.load(Ordering::Relaxed);
        let rejected_submissions = self.inner.rejected_submissions.load(Ordering::Relaxed);
        let batches_written = self.inner.batches_written.load(Ordering::Relaxed);
        let items_written = self.inner.items_written.load(Ordering::Relaxed);
        let write_failures = self.inner.write_failures.load(Ordering::Relaxed);
        let items_failed = self.inner.items_failed.load(Ordering::Relaxed);
        let callback_failures = self.inner.callback_failures.load(Ordering::Relaxed);
        let largest_batch = self.inner.largest_batch.load(Ordering::Relaxed);
        let total_write_time_us = self.inner.total_write_time_us.load(Ordering::Relaxed);

        let (avg_batch_size, avg_write_time_us) = if batches_written > 0 {
            (
                (items_written + items_failed) as f64 / batches_written as f64,
                total_write_time_us / batches_written,
            )
        } else {
            (0.0, 0)
        };

        let recent = self.inner.recent_batches.read();
        let batch_size_p50 = snapshot::calculate_percentile(&recent.last_100_sizes, 50);
        let batch_size_p99 = snapshot::calculate_percentile(&recent.last_100_sizes, 99);
        let write_p50 = snapshot::calculate_percentile(&recent.last_100_write_times_us, 50);
        let write_p95 = snapshot::calculate_percentile(&recent.last_100_write_times_us, 95);
        let write_p99 = snapshot::calculate_percentile(&recent.last_100_write_times_us, 99);
        let last_batch_failed = recent.last_batch_failed;
        let last_batch_secs = recent.last_batch_timestamp.map(|t| t.elapsed().as_secs());
        drop(recent);

        MetricsSnapshot {
            submissions,
            direct_admissions,
            queued_submissions,
            cancelled_submissions,
            rejected_submissions,
            batches_written,
            items_written,
            write_failures,
            items_failed,
            callback_failures,
            largest_batch,
            avg_batch_size,
            avg_write_time_us,
            batch_size_p50,
            batch_size_p99,
            write_p50_us: write_p50,
            write_p95_us: write_p95,
            write_p99_us: write_p99,
            last_batch_failed,
            last_batch_secs,
        }
    }

    pub fn health(&self) -> HealthStatus {
        let snapshot = self.snapshot();
        health::derive_health(&snapshot)
    }
}

impl Default for CoordinatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}
