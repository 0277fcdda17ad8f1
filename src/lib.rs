//! # batchwrite
//!
//! A batching write coordinator: many threads submit items, at most one of
//! them performs the actual write at any time, and everything that piles up
//! while that write is in flight goes out together in the next sink call.
//!
//! ## Features
//!
//! - **No background worker**: the writer role is taken by whichever caller
//!   wins a non-blocking admission race
//! - **Group commit**: a burst of submissions becomes one sink call
//! - **Backpressure**: a bounded queue stalls producers when the sink lags
//! - **Cancellable waits**: blocked producers can be released via
//!   [`CancellationToken`]
//! - **Context propagation**: callbacks can run inside the submitter's
//!   `tracing` span
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::mpsc;
//!
//! use batchwrite::{BatchingWriteCoordinator, BatchResult, CoordinatorSettings};
//!
//! let sink = |records: &[String]| -> BatchResult<()> {
//!     // append `records` and fsync once
//!     assert!(!records.is_empty());
//!     Ok(())
//! };
//! let coordinator = BatchingWriteCoordinator::new(CoordinatorSettings::new(128), sink)?;
//!
//! let (tx, rx) = mpsc::channel();
//! coordinator.submit("hello".to_string(), move |outcome| {
//!     tx.send(outcome.is_ok()).unwrap();
//! });
//! assert!(rx.recv().unwrap());
//! # Ok::<(), batchwrite::BatchWriteError>(())
//! ```

pub mod api;
pub mod runtime;

pub use crate::api::{error, types};
pub use crate::runtime::{coordinator, metrics};

pub use api::error::{BatchResult, BatchWriteError};
pub use api::types::{completion, Completion, WriteOutcome};
pub use runtime::coordinator::{
    BatchingWriteCoordinator, CancellationToken, ContextPropagator, CoordinatorSettings,
    NoContext, SpanContext, WriteSink,
};
pub use runtime::metrics::{
    CoordinatorMetrics, HealthState, HealthStatus, MetricsSnapshot,
};
