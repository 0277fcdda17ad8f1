//! Construction-time configuration for the batching coordinator.
//!
//! `CoordinatorSettings` groups the knobs fixed when a coordinator is built.
//! Nothing here can be changed once the coordinator exists.

use serde::{Deserialize, Serialize};

use crate::error::{BatchResult, BatchWriteError};

/// Default number of entries that may wait for the active writer.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// High level configuration for [`BatchingWriteCoordinator`](super::BatchingWriteCoordinator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorSettings {
    /// Maximum number of queued entries. Producers block once it is reached.
    pub queue_capacity: usize,
}

impl CoordinatorSettings {
    pub fn new(queue_capacity: usize) -> Self {
        Self { queue_capacity }
    }

    pub fn with_queue_capacity(mut self, queue_capacity: usize) -> Self {
        self.queue_capacity = queue_capacity;
        self
    }

    pub fn validate(&self) -> BatchResult<()> {
        if self.queue_capacity == 0 {
            return Err(BatchWriteError::InvalidConfiguration {
                field: "queue_capacity",
                min: 1,
                value: self.queue_capacity,
            });
        }
        Ok(())
    }
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}
