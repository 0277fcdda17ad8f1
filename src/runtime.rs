//! Runtime protocols: write coordination and metrics collection.

pub mod coordinator;
pub mod metrics;

pub mod prelude {
    pub use super::coordinator::{
        BatchingWriteCoordinator, CancellationToken, ContextPropagator, CoordinatorSettings,
        NoContext, SpanContext, WriteSink,
    };
    pub use super::metrics::{CoordinatorMetrics, HealthState, HealthStatus, MetricsSnapshot};
}
