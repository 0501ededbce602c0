use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the catalog store, then report degraded mode and the configured providers.
///
/// A failed ping is only logged: the storage supervisor owns the degraded flag.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.catalog_store().await {
        Some(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "catalog store ping failed");
            }
        }
        None => warn!("no catalog store installed; serving in degraded mode"),
    }

    HealthResponse::new(state.is_degraded(), state.providers().configured())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        dao::{catalog_store::memory::MemoryCatalogStore, providers::ProviderRegistry},
        dto::health::ServiceStatus,
        state::AppState,
    };

    #[tokio::test]
    async fn degraded_until_a_store_is_installed() {
        let state = AppState::new(ProviderRegistry::default());
        assert_eq!(
            health_status(&state).await.status,
            ServiceStatus::Degraded
        );

        state
            .install_catalog_store(Arc::new(MemoryCatalogStore::new()))
            .await;
        let report = health_status(&state).await;
        assert_eq!(report.status, ServiceStatus::Ok);
        assert!(report.providers.is_empty());
    }
}
