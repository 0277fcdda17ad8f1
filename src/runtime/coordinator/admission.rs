use std::sync::atomic::{AtomicBool, Ordering};

/// Single-permit admission token deciding which caller acts as the writer.
///
/// Acquisition never blocks: a caller that loses the race enqueues its entry
/// instead of parking until the permit frees up.
#[derive(Debug, Default)]
pub(crate) struct WriterAdmission {
    held: AtomicBool,
}

impl WriterAdmission {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn try_acquire(&self) -> Option<AdmissionPermit<'_>> {
        self.held
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| AdmissionPermit { admission: self })
    }

    pub(crate) fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

/// Proof of admission. Dropping it hands the writer role back.
#[derive(Debug)]
pub(crate) struct AdmissionPermit<'a> {
    admission: &'a WriterAdmission,
}

impl Drop for AdmissionPermit<'_> {
    fn drop(&mut self) {
        self.admission.held.store(false, Ordering::SeqCst);
    }
}
