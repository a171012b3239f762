use std::{sync::Arc, time::Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::{
    clients::store::ContentStore,
    config::ServiceRole,
    models::health::{HealthReport, StoreCheck, StoreState},
};

pub struct HealthChecker {
    role: ServiceRole,
    store: Option<Arc<dyn ContentStore>>,
}

impl HealthChecker {
    pub fn new(role: ServiceRole, store: Option<Arc<dyn ContentStore>>) -> Self {
        Self { role, store }
    }

    pub async fn report(&self) -> HealthReport {
        let store = self.check_store().await;

        HealthReport {
            healthy: store.state != StoreState::Unreachable,
            role: self.role,
            checked_at: Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            store,
        }
    }

    async fn check_store(&self) -> StoreCheck {
        let Some(store) = &self.store else {
            return StoreCheck::unbound();
        };

        let start = Instant::now();

        match store.ping().await {
            Ok(()) => {
                let elapsed = start.elapsed().as_millis() as u64;
                debug!(latency_ms = elapsed, "Content store ping succeeded");
                StoreCheck::reachable(elapsed)
            }
            Err(e) => {
                warn!(error = %e, "Content store ping failed");
                StoreCheck::unreachable(e.to_string())
            }
        }
    }
}
