use crate::types::Completion;

/// An item paired with its completion, as held while queued.
pub(crate) struct PendingEntry<T, S> {
    pub(crate) item: T,
    pub(crate) completion: Completion,
    pub(crate) context: S,
}

impl<T, S> PendingEntry<T, S> {
    pub(crate) fn new(item: T, completion: Completion, context: S) -> Self {
        Self {
            item,
            completion,
            context,
        }
    }
}

/// Entries collected by the active writer for a single sink call.
///
/// Items and completions are kept side by side so the sink sees a plain
/// slice of items while completions wait for the outcome.
pub(crate) struct Batch<T, S> {
    items: Vec<T>,
    completions: Vec<(Completion, S)>,
}

impl<T, S> Batch<T, S> {
    pub(crate) fn new() -> Self {
        Self {
            items: Vec::new(),
            completions: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, entry: PendingEntry<T, S>) {
        self.items.push(entry.item);
        self.completions.push((entry.completion, entry.context));
    }

    pub(crate) fn items(&self) -> &[T] {
        &self.items
    }

    /// Drops the written items and hands back the completions to notify.
    pub(crate) fn take_completions(&mut self) -> std::vec::Drain<'_, (Completion, S)> {
        self.items.clear();
        self.completions.drain(..)
    }
}

impl<T, S> Default for Batch<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, S> Extend<PendingEntry<T, S>> for Batch<T, S> {
    fn extend<I: IntoIterator<Item = PendingEntry<T, S>>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}
