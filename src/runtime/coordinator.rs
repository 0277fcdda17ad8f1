//! Batching write coordinator.
//!
//! Many producers hand items to [`BatchingWriteCoordinator::submit`]; at most one
//! of them at a time becomes the *active writer*. The writer drains whatever has
//! queued up while it was busy, calls the [`WriteSink`] once for the whole batch,
//! hands the admission token back, and only then runs the completion callbacks.
//! There is no background thread: the writer role is taken by whichever caller
//! wins admission.
//!
//! The invariants that callers rely on are:
//! - the sink is never entered by two threads at once;
//! - every submitted item lands in exactly one batch, and its completion runs
//!   exactly once (or receives `Cancelled` instead, without being written);
//! - a full queue stalls producers instead of growing or dropping entries.

mod admission;
mod batch;
mod cancel;
mod context;
mod queue;
pub mod settings;

use admission::{AdmissionPermit, WriterAdmission};
use batch::{Batch, PendingEntry};
pub use cancel::CancellationToken;
pub use context::{ContextPropagator, NoContext, SpanContext};
pub use settings::CoordinatorSettings;

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use crate::error::{BatchResult, BatchWriteError};
use crate::metrics::{CoordinatorMetrics, HealthStatus};
use crate::types::{panic_message, Completion, WriteOutcome};

use self::queue::EntryQueue;

/// Destination for batches assembled by the coordinator.
///
/// Called from whichever thread is the active writer, never concurrently with
/// itself. The whole batch succeeds or fails as one; the sink must not call
/// back into the coordinator.
pub trait WriteSink<T>: Send + Sync {
    fn write(&self, batch: &[T]) -> BatchResult<()>;
}

impl<T, F> WriteSink<T> for F
where
    F: Fn(&[T]) -> BatchResult<()> + Send + Sync,
{
    fn write(&self, batch: &[T]) -> BatchResult<()> {
        self(batch)
    }
}

type Entry<T, C> = PendingEntry<T, <C as ContextPropagator>::Snapshot>;

pub struct BatchingWriteCoordinator<T, W, C = NoContext>
where
    T: Send + 'static,
    W: WriteSink<T>,
    C: ContextPropagator,
{
    queue: Arc<EntryQueue<Entry<T, C>>>,
    admission: WriterAdmission,
    sink: W,
    context: C,
    metrics: CoordinatorMetrics,
}

impl<T, W> BatchingWriteCoordinator<T, W, NoContext>
where
    T: Send + 'static,
    W: WriteSink<T>,
{
    pub fn new(settings: CoordinatorSettings, sink: W) -> BatchResult<Self> {
        Self::with_context(settings, sink, NoContext)
    }
}

impl<T, W, C> BatchingWriteCoordinator<T, W, C>
where
    T: Send + 'static,
    W: WriteSink<T>,
    C: ContextPropagator,
{
    pub fn with_context(settings: CoordinatorSettings, sink: W, context: C) -> BatchResult<Self> {
        settings.validate()?;
        Ok(Self {
            queue: Arc::new(EntryQueue::new(settings.queue_capacity)),
            admission: WriterAdmission::new(),
            sink,
            context,
            metrics: CoordinatorMetrics::new(),
        })
    }

    /// Submits `item`; `callback` later receives the outcome of its batch.
    ///
    /// Blocks only while the queue is full. The callback may run on this
    /// thread or on whichever thread is the active writer.
    pub fn submit<F>(&self, item: T, callback: F)
    where
        F: FnOnce(WriteOutcome) + Send + 'static,
    {
        self.submit_entry(item, Box::new(callback), None);
    }

    /// Like [`submit`](Self::submit), but a wait for queue capacity is abandoned
    /// once `cancel` fires. The callback then receives
    /// [`BatchWriteError::Cancelled`] and the item is never written.
    pub fn submit_cancellable<F>(&self, item: T, callback: F, cancel: &CancellationToken)
    where
        F: FnOnce(WriteOutcome) + Send + 'static,
    {
        self.submit_entry(item, Box::new(callback), Some(cancel));
    }

    /// Submits a dynamically assembled entry.
    ///
    /// A missing item or callback is rejected with
    /// [`BatchWriteError::InvalidArgument`] before anything is queued.
    pub fn submit_parts(
        &self,
        item: Option<T>,
        callback: Option<Completion>,
        cancel: Option<&CancellationToken>,
    ) -> BatchResult<()> {
        let Some(item) = item else {
            self.metrics.record_rejected();
            return Err(BatchWriteError::InvalidArgument { argument: "item" });
        };
        let Some(callback) = callback else {
            self.metrics.record_rejected();
            return Err(BatchWriteError::InvalidArgument {
                argument: "callback",
            });
        };
        self.submit_entry(item, callback, cancel);
        Ok(())
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Whether some thread currently holds the writer role.
    pub fn is_writing(&self) -> bool {
        self.admission.is_held()
    }

    pub fn metrics(&self) -> &CoordinatorMetrics {
        &self.metrics
    }

    pub fn health(&self) -> HealthStatus {
        self.metrics.health()
    }

    fn submit_entry(&self, item: T, completion: Completion, cancel: Option<&CancellationToken>) {
        let entry = PendingEntry::new(item, completion, self.context.capture());
        let mut batch = Batch::new();

        let permit = match self.admission.try_acquire() {
            Some(permit) => {
                self.metrics.record_submission(true);
                batch.push(entry);
                permit
            }
            None => {
                if let Err(entry) = self.queue.push(entry, cancel) {
                    self.metrics.record_cancelled();
                    tracing::debug!("Submission cancelled while waiting for queue capacity");
                    let cancelled: WriteOutcome = Err(Arc::new(BatchWriteError::Cancelled));
                    self.notify(entry.completion, entry.context, &cancelled);
                    return;
                }
                self.metrics.record_submission(false);
                // Our entry is now in the queue; if we win admission it is drained
                // from there like any other.
                match self.admission.try_acquire() {
                    Some(permit) => permit,
                    None => return,
                }
            }
        };

        self.drain_process_release(&mut batch, permit);
        while !self.queue.is_empty() {
            let Some(permit) = self.admission.try_acquire() else {
                break;
            };
            self.drain_process_release(&mut batch, permit);
        }
    }

    fn drain_process_release(
        &self,
        batch: &mut Batch<T, C::Snapshot>,
        permit: AdmissionPermit<'_>,
    ) {
        self.queue.drain_into(batch);
        let outcome = self.write_batch(batch.items());
        drop(permit);

        for (completion, context) in batch.take_completions() {
            self.notify(completion, context, &outcome);
        }
    }

    fn write_batch(&self, items: &[T]) -> WriteOutcome {
        if items.is_empty() {
            return Ok(());
        }

        let started_at = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| self.sink.write(items)))
            .unwrap_or_else(|payload| {
                Err(BatchWriteError::WriteFailure {
                    reason: format!("write sink panicked: {}", panic_message(payload.as_ref())),
                })
            });
        let elapsed = started_at.elapsed();

        match result {
            Ok(()) => {
                self.metrics.record_batch(items.len(), elapsed, true);
                tracing::trace!(batch_len = items.len(), ?elapsed, "Batch written");
                Ok(())
            }
            Err(err) => {
                self.metrics.record_batch(items.len(), elapsed, false);
                tracing::debug!(batch_len = items.len(), error = %err, "Failed to write batch");
                Err(Arc::new(err))
            }
        }
    }

    fn notify(&self, completion: Completion, context: C::Snapshot, outcome: &WriteOutcome) {
        let outcome = outcome.clone();
        let invoke = move || {
            let _scope = self.context.restore(context);
            completion(outcome)
        };
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(invoke)) {
            self.metrics.record_callback_failure();
            let err = BatchWriteError::CallbackFailure {
                reason: panic_message(payload.as_ref()),
            };
            tracing::warn!(error = %err, "Failed to notify completion callback");
        }
    }
}

impl<T, W, C> std::fmt::Debug for BatchingWriteCoordinator<T, W, C>
where
    T: Send + 'static,
    W: WriteSink<T>,
    C: ContextPropagator,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchingWriteCoordinator")
            .field("queue_len", &self.queue.len())
            .field("queue_capacity", &self.queue.capacity())
            .field("writing", &self.admission.is_held())
            .finish()
    }
}
