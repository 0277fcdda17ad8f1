use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::{Condvar, Mutex};

use super::cancel::{CancellationToken, Interrupt};

/// Bounded multi-producer queue feeding the active writer.
///
/// Producers block while the queue is full; the writer drains everything at
/// once and never blocks.
pub struct EntryQueue<E> {
    inner: Mutex<VecDeque<E>>,
    not_full: Condvar,
    max_size: usize,
}

impl<E: Send + 'static> EntryQueue<E> {
    pub fn new(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            inner: Mutex::new(VecDeque::with_capacity(max_size)),
            not_full: Condvar::new(),
            max_size,
        }
    }

    /// Appends `entry`, waiting for capacity if needed.
    ///
    /// Returns the entry untouched when `cancel` fires while waiting.
    pub fn push(self: &Arc<Self>, entry: E, cancel: Option<&CancellationToken>) -> Result<(), E> {
        let mut queue = self.inner.lock();
        if queue.len() >= self.max_size {
            if let Some(token) = cancel {
                let waiter: Weak<dyn Interrupt> = Arc::downgrade(self) as Weak<dyn Interrupt>;
                token.register(waiter);
            }
            while queue.len() >= self.max_size {
                if cancel.is_some_and(CancellationToken::is_cancelled) {
                    return Err(entry);
                }
                self.not_full.wait(&mut queue);
            }
        }
        queue.push_back(entry);
        Ok(())
    }

    /// Moves every queued entry into `batch`, in arrival order.
    pub fn drain_into<B: Extend<E>>(&self, batch: &mut B) -> usize {
        let mut queue = self.inner.lock();
        let drained = queue.len();
        if drained > 0 {
            batch.extend(queue.drain(..));
            self.not_full.notify_all();
        }
        drained
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

impl<E: Send + 'static> Interrupt for EntryQueue<E> {
    fn interrupt(&self) {
        let _queue = self.inner.lock();
        self.not_full.notify_all();
    }
}
