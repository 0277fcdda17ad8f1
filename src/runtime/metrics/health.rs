use serde::{Deserialize, Serialize};

use super::MetricsSnapshot;

const RESPONSIVE_WINDOW_SECS: u64 = 60;

/// Health status of the coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub state: HealthState,
    pub batches_written: u64,
    pub write_failures: u64,
    pub callback_failures: u64,
    pub last_batch_secs: Option<u64>,
}

/// Health state enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthState {
    Healthy,
    Idle,
    Degraded,
    Unhealthy,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "HEALTHY"),
            HealthState::Idle => write!(f, "IDLE"),
            HealthState::Degraded => write!(f, "DEGRADED"),
            HealthState::Unhealthy => write!(f, "UNHEALTHY"),
        }
    }
}

pub(crate) fn derive_health(snapshot: &MetricsSnapshot) -> HealthStatus {
    let has_activity = snapshot.last_batch_secs.is_some();
    let is_responsive = snapshot
        .last_batch_secs
        .map(|secs| secs < RESPONSIVE_WINDOW_SECS)
        .unwrap_or(false);

    let state = if snapshot.last_batch_failed {
        HealthState::Unhealthy
    } else if snapshot.callback_failures > 0 {
        HealthState::Degraded
    } else if !has_activity || !is_responsive {
        HealthState::Idle
    } else {
        HealthState::Healthy
    };

    HealthStatus {
        state,
        batches_written: snapshot.batches_written,
        write_failures: snapshot.write_failures,
        callback_failures: snapshot.callback_failures,
        last_batch_secs: snapshot.last_batch_secs,
    }
}
