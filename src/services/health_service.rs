use crate::adapters::Store;
use crate::config::HealthConfig;
use opentelemetry::{KeyValue, global, metrics::Gauge};
use std::time::Duration;
use tokio::time::timeout;

#[derive(Clone, Debug)]
pub struct Metrics {
    pub status: Gauge<i64>,
}

impl Metrics {
    #[must_use]
    pub(crate) fn new() -> Self {
        let meter = global::meter("agro-user-service");
        Self {
            status: meter
                .i64_gauge("agro_health_status")
                .with_description("Status of health checks (1 for ok, 0 for error)")
                .build(),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
pub struct HealthService {
    store: Store,
    config: HealthConfig,
    metrics: Metrics,
}

impl HealthService {
    #[must_use]
    pub fn new(store: Store, config: HealthConfig) -> Self {
        Self { store, config, metrics: Metrics::new() }
    }

    /// Checks store connectivity.
    ///
    /// # Errors
    /// Returns a string describing the failure if the store is unreachable.
    pub async fn check_store(&self) -> Result<(), String> {
        let store_timeout = Duration::from_millis(self.config.store_timeout_ms);
        let attrs = [KeyValue::new("component", "store"), KeyValue::new("store.kind", self.store.kind().as_str())];

        match timeout(store_timeout, self.store.ping()).await {
            Ok(Ok(())) => {
                self.metrics.status.record(1, &attrs);
                Ok(())
            }
            Ok(Err(e)) => {
                self.metrics.status.record(0, &attrs);
                Err(format!("Store connection failed: {e}"))
            }
            Err(_) => {
                self.metrics.status.record(0, &attrs);
                Err("Store connection timed out".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_memory_store_is_healthy() {
        let service = HealthService::new(Store::Memory(Arc::default()), HealthConfig { store_timeout_ms: 100 });
        assert!(service.check_store().await.is_ok());
    }

    #[tokio::test]
    async fn test_closed_pool_is_unhealthy() {
        let pool = sqlx::PgPool::connect_lazy("postgres://localhost/test").unwrap();
        pool.close().await;
        let service = HealthService::new(Store::Postgres(pool), HealthConfig { store_timeout_ms: 500 });

        assert!(service.check_store().await.is_err());
    }
}
