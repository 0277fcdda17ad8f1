//! Public API surface for batchwrite consumers.
//!
//! This module groups the error definitions and the lightweight value types
//! (completions, outcomes) that callers handle without touching the
//! coordinator runtime itself.

pub mod error;
pub mod types;

pub mod prelude {
    pub use super::error::{BatchResult, BatchWriteError};
    pub use super::types::*;
}
