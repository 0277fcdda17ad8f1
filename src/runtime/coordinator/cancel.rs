use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Something a blocked submitter may be parked on.
///
/// Implementors must take the same lock the waiter checks the cancellation
/// flag under before notifying, otherwise the wake-up can be lost.
pub(crate) trait Interrupt: Send + Sync {
    fn interrupt(&self);
}

/// Cancels submissions that are blocked waiting for queue capacity.
///
/// Cloning yields a handle to the same token. Cancellation is one-way.
#[derive(Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Default)]
struct TokenInner {
    cancelled: AtomicBool,
    waiters: Mutex<Vec<Weak<dyn Interrupt>>>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled and wakes every submitter blocked on it.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let waiters = std::mem::take(&mut *self.inner.waiters.lock());
        for waiter in waiters {
            if let Some(waiter) = waiter.upgrade() {
                waiter.interrupt();
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    pub(crate) fn register(&self, waiter: Weak<dyn Interrupt>) {
        let mut waiters = self.inner.waiters.lock();
        waiters.retain(|existing| existing.strong_count() > 0);
        if !waiters.iter().any(|existing| Weak::ptr_eq(existing, &waiter)) {
            waiters.push(waiter);
        }
    }

    #[cfg(test)]
    fn registered(&self) -> usize {
        self.inner.waiters.lock().len()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
