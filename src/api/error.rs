use thiserror::Error;

pub type BatchResult<T> = Result<T, BatchWriteError>;

#[derive(Debug, Error)]
pub enum BatchWriteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid argument: {argument} must not be absent")]
    InvalidArgument { argument: &'static str },

    #[error("submission cancelled while waiting for queue capacity")]
    Cancelled,

    #[error("batch write failed: {reason}")]
    WriteFailure { reason: String },

    #[error("completion callback failed: {reason}")]
    CallbackFailure { reason: String },

    #[error("invalid configuration: {field} must be at least {min}, got {value}")]
    InvalidConfiguration {
        field: &'static str,
        min: usize,
        value: usize,
    },
}

impl BatchWriteError {
    /// Convenience constructor for sinks reporting a batch-level failure.
    pub fn write_failure(reason: impl Into<String>) -> Self {
        Self::WriteFailure {
            reason: reason.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
