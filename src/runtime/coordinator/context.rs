//! Ambient context carried from a submitter to its completion callback.
//!
//! Callbacks run on whichever thread happens to be the active writer. A
//! [`ContextPropagator`] captures the submitter's context inside `submit` and
//! restores it around that submitter's callback only, as an explicit scoped
//! acquisition.

use tracing::span::EnteredSpan;
use tracing::Span;

/// Capture/restore hook applied around each completion callback.
pub trait ContextPropagator: Send + Sync {
    /// State captured on the submitting thread.
    type Snapshot: Send + 'static;
    /// Held for the duration of the callback; dropping it ends the restore.
    type Scope;

    fn capture(&self) -> Self::Snapshot;

    fn restore(&self, snapshot: Self::Snapshot) -> Self::Scope;
}

/// Propagates nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl ContextPropagator for NoContext {
    type Snapshot = ();
    type Scope = ();

    fn capture(&self) -> Self::Snapshot {}

    fn restore(&self, _snapshot: Self::Snapshot) -> Self::Scope {}
}

/// Re-enters the submitter's current `tracing` span around its callback.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpanContext;

impl ContextPropagator for SpanContext {
    type Snapshot = Span;
    type Scope = EnteredSpan;

    fn capture(&self) -> Self::Snapshot {
        Span::current()
    }

    fn restore(&self, snapshot: Self::Snapshot) -> Self::Scope {
        snapshot.entered()
    }
}
