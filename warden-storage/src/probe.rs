//! Dependency reachability probe.

use std::sync::Arc;
use std::time::Duration;
use warden_core::{DependencyHealth, StoreError};

use crate::counter::CounterStore;
use crate::document::DocumentStore;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Pings both stores concurrently and reports which answered.
///
/// Never fails: an error, or no answer within the probe timeout, marks
/// that store down.
#[derive(Clone)]
pub struct DependencyProbe {
    documents: Arc<dyn DocumentStore>,
    counters: Arc<dyn CounterStore>,
}

impl DependencyProbe {
    pub fn new(documents: Arc<dyn DocumentStore>, counters: Arc<dyn CounterStore>) -> Self {
        Self {
            documents,
            counters,
        }
    }

    pub async fn check_dependencies(&self) -> DependencyHealth {
        let (store, counter) = tokio::join!(
            tokio::time::timeout(PROBE_TIMEOUT, self.documents.ping()),
            tokio::time::timeout(PROBE_TIMEOUT, self.counters.ping()),
        );

        DependencyHealth {
            store_up: answered("document store", store),
            counter_up: answered("counter store", counter),
        }
    }
}

fn answered(
    dependency: &'static str,
    outcome: Result<Result<(), StoreError>, tokio::time::error::Elapsed>,
) -> bool {
    match outcome {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            tracing::debug!(dependency, error = %err, "Health ping failed");
            false
        }
        Err(_) => {
            tracing::debug!(dependency, "Health ping timed out");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{InMemoryCounterStore, InMemoryDocumentStore};
    use warden_core::GatewayStatus;

    #[tokio::test]
    async fn test_probe_reports_each_store() {
        let documents = Arc::new(InMemoryDocumentStore::new());
        let counters = Arc::new(InMemoryCounterStore::new());
        let probe = DependencyProbe::new(documents.clone(), counters.clone());

        assert_eq!(probe.check_dependencies().await.status(), GatewayStatus::Up);

        counters.set_offline(true);
        let health = probe.check_dependencies().await;
        assert!(health.store_up);
        assert!(!health.counter_up);

        documents.set_offline(true);
        counters.set_offline(false);
        let health = probe.check_dependencies().await;
        assert!(!health.store_up);
        assert!(health.counter_up);
        assert_eq!(health.status(), GatewayStatus::Degraded);
    }
}
