use std::any::Any;
use std::sync::Arc;

use super::error::BatchWriteError;

/// Outcome delivered to a completion callback.
///
/// `Ok(())` means the batch holding the item was written. The failure is
/// shared so a single sink error reaches every member of its batch unchanged.
pub type WriteOutcome = Result<(), Arc<BatchWriteError>>;

/// Single-shot completion callback attached to a submitted item.
pub type Completion = Box<dyn FnOnce(WriteOutcome) + Send + 'static>;

/// Boxes a closure into a [`Completion`].
pub fn completion<F>(callback: F) -> Completion
where
    F: FnOnce(WriteOutcome) + Send + 'static,
{
    Box::new(callback)
}

/// Best-effort rendering of a panic payload for diagnostics.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
