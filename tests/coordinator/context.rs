use std::cell::{Cell, RefCell};
use std::sync::Arc;
use std::thread;

use batchwrite::{BatchingWriteCoordinator, ContextPropagator, CoordinatorSettings, SpanContext};
use parking_lot::Mutex;

use super::support::{init_tracing, CompletionLog, GatedSink, DEFAULT_TIMEOUT};

thread_local! {
    static REQUEST_ID: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn set_request_id(id: Option<String>) -> Option<String> {
    REQUEST_ID.with(|slot| std::mem::replace(&mut *slot.borrow_mut(), id))
}

fn current_request_id() -> Option<String> {
    REQUEST_ID.with(|slot| slot.borrow().clone())
}

/// Carries the per-thread request id from submitter to callback.
struct RequestIdPropagator;

struct RestoredRequestId {
    previous: Option<String>,
}

impl Drop for RestoredRequestId {
    fn drop(&mut self) {
        set_request_id(self.previous.take());
    }
}

impl ContextPropagator for RequestIdPropagator {
    type Snapshot = Option<String>;
    type Scope = RestoredRequestId;

    fn capture(&self) -> Self::Snapshot {
        current_request_id()
    }

    fn restore(&self, snapshot: Self::Snapshot) -> Self::Scope {
        RestoredRequestId {
            previous: set_request_id(snapshot),
        }
    }
}

#[test]
fn callbacks_observe_their_submitters_context() {
    init_tracing();

    let gate = GatedSink::new();
    let coordinator = Arc::new(
        BatchingWriteCoordinator::with_context(
            CoordinatorSettings::new(4),
            gate.sink(),
            RequestIdPropagator,
        )
        .unwrap(),
    );
    let observed = Arc::new(Mutex::new(Vec::new()));

    let writer = {
        let coordinator = Arc::clone(&coordinator);
        let observed = Arc::clone(&observed);
        thread::Builder::new()
            .name("writer".to_string())
            .spawn(move || {
                set_request_id(Some("writer-request".to_string()));
                coordinator.submit(1, move |_| {
                    observed.lock().push((
                        1,
                        current_request_id(),
                        thread::current().name().map(str::to_string),
                    ));
                });
                current_request_id()
            })
            .unwrap()
    };
    assert!(gate.wait_entered(1, DEFAULT_TIMEOUT));

    let submitter = {
        let coordinator = Arc::clone(&coordinator);
        let observed = Arc::clone(&observed);
        thread::Builder::new()
            .name("submitter".to_string())
            .spawn(move || {
                set_request_id(Some("submitter-request".to_string()));
                coordinator.submit(2, move |_| {
                    observed.lock().push((
                        2,
                        current_request_id(),
                        thread::current().name().map(str::to_string),
                    ));
                });
            })
            .unwrap()
    };
    submitter.join().unwrap();
    assert_eq!(coordinator.queue_len(), 1);

    gate.open();
    let writer_id_after = writer.join().unwrap();

    let observed = observed.lock().clone();
    assert_eq!(
        observed,
        vec![
            (
                1,
                Some("writer-request".to_string()),
                Some("writer".to_string())
            ),
            (
                2,
                Some("submitter-request".to_string()),
                Some("writer".to_string())
            ),
        ]
    );
    assert_eq!(writer_id_after, Some("writer-request".to_string()));
}

#[test]
fn span_context_follows_a_queued_submission_to_the_writer_thread() {
    let dispatch = tracing::Dispatch::new(tracing_subscriber::fmt().with_test_writer().finish());
    let gate = GatedSink::new();
    let coordinator = Arc::new(
        BatchingWriteCoordinator::with_context(
            CoordinatorSettings::new(4),
            gate.sink(),
            SpanContext,
        )
        .unwrap(),
    );
    let seen = Arc::new(Mutex::new(None));

    let writer = {
        let coordinator = Arc::clone(&coordinator);
        let dispatch = dispatch.clone();
        thread::Builder::new()
            .name("writer".to_string())
            .spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || coordinator.submit(1, |_| {}))
            })
            .unwrap()
    };
    assert!(gate.wait_entered(1, DEFAULT_TIMEOUT));

    tracing::dispatcher::with_default(&dispatch, || {
        let span = tracing::info_span!("request", id = 42);
        let expected = span.id();
        assert!(expected.is_some());

        let recorded = Arc::clone(&seen);
        span.in_scope(|| {
            coordinator.submit(2, move |_| {
                *recorded.lock() = Some((
                    tracing::Span::current().id(),
                    thread::current().name().map(str::to_string),
                ));
            });
        });
        assert_eq!(coordinator.queue_len(), 1);
        assert!(seen.lock().is_none());

        gate.open();
        writer.join().unwrap();

        assert_eq!(*seen.lock(), Some((expected, Some("writer".to_string()))));
    });
}

thread_local! {
    static TENANT: Cell<u32> = const { Cell::new(0) };
}

/// Carries a tenant number; restoring tenant 7 fails.
struct FragileTenantPropagator;

impl ContextPropagator for FragileTenantPropagator {
    type Snapshot = u32;
    type Scope = ();

    fn capture(&self) -> Self::Snapshot {
        TENANT.with(Cell::get)
    }

    fn restore(&self, snapshot: Self::Snapshot) -> Self::Scope {
        assert_ne!(snapshot, 7, "tenant 7 cannot be restored");
        TENANT.with(|tenant| tenant.set(snapshot));
    }
}

#[test]
fn failed_context_restore_skips_only_its_own_callback() {
    init_tracing();

    let gate = GatedSink::new();
    let coordinator = Arc::new(
        BatchingWriteCoordinator::with_context(
            CoordinatorSettings::new(4),
            gate.sink(),
            FragileTenantPropagator,
        )
        .unwrap(),
    );
    let log = CompletionLog::new();

    let writer = {
        let coordinator = Arc::clone(&coordinator);
        let log = Arc::clone(&log);
        thread::spawn(move || coordinator.submit(1, log.callback(1)))
    };
    assert!(gate.wait_entered(1, DEFAULT_TIMEOUT));

    TENANT.with(|tenant| tenant.set(7));
    coordinator.submit(2, log.callback(2));
    TENANT.with(|tenant| tenant.set(0));
    coordinator.submit(3, log.callback(3));
    assert_eq!(coordinator.queue_len(), 2);

    gate.open();
    assert!(writer.join().is_ok());

    assert_eq!(gate.batches(), vec![vec![1], vec![2, 3]]);
    assert_eq!(log.items(), vec![1, 3]);
    assert!(log.entries().iter().all(|(_, outcome)| outcome.is_ok()));
    assert_eq!(coordinator.metrics().snapshot().callback_failures, 1);
    assert!(!coordinator.is_writing());
}
