use serde::{Deserialize, Serialize};

use crate::config::ServiceRole;

/// Reachability of the content store as seen by `/health`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreState {
    Reachable,
    Unbound,
    Unreachable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCheck {
    pub state: StoreState,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StoreCheck {
    pub fn reachable(latency_ms: u64) -> Self {
        Self {
            state: StoreState::Reachable,
            latency_ms: Some(latency_ms),
            error: None,
        }
    }

    pub fn unreachable(error: String) -> Self {
        Self {
            state: StoreState::Unreachable,
            latency_ms: None,
            error: Some(error),
        }
    }

    pub fn unbound() -> Self {
        Self {
            state: StoreState::Unbound,
            latency_ms: None,
            error: None,
        }
    }
}

/// The relay itself answers as long as it can serve requests; only an
/// unreachable store makes the report unhealthy. An unbound store is a
/// deployment choice (for instance a sender without a viewer) and is reported
/// without failing the check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub healthy: bool,
    pub role: ServiceRole,
    pub checked_at: String,
    pub store: StoreCheck,
}
