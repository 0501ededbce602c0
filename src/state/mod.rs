use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    dao::{
        catalog_store::CatalogStore,
        providers::{MetadataProvider, ProviderId, ProviderRegistry},
    },
    error::ServiceError,
};

pub type SharedState = Arc<AppState>;

/// Central application state holding the catalog store handle and the upstream providers.
pub struct AppState {
    catalog_store: RwLock<Option<Arc<dyn CatalogStore>>>,
    providers: ProviderRegistry,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(providers: ProviderRegistry) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            catalog_store: RwLock::new(None),
            providers,
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current catalog store, if one is installed.
    pub async fn catalog_store(&self) -> Option<Arc<dyn CatalogStore>> {
        let guard = self.catalog_store.read().await;
        guard.as_ref().cloned()
    }

    /// Catalog store handle, or [`ServiceError::Degraded`] when none is installed.
    pub async fn require_catalog_store(&self) -> Result<Arc<dyn CatalogStore>, ServiceError> {
        self.catalog_store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a new catalog store implementation and leave degraded mode.
    pub async fn install_catalog_store(&self, store: Arc<dyn CatalogStore>) {
        {
            let mut guard = self.catalog_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current catalog store and enter degraded mode.
    pub async fn clear_catalog_store(&self) -> Option<Arc<dyn CatalogStore>> {
        let previous = {
            let mut guard = self.catalog_store.write().await;
            guard.take()
        };
        self.update_degraded(true);
        previous
    }

    /// Current degraded flag.
    pub fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Registered upstream providers.
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Provider handle, or [`ServiceError::ProviderNotConfigured`].
    pub fn require_provider(&self, id: ProviderId) -> Result<Arc<dyn MetadataProvider>, ServiceError> {
        self.providers
            .get(id)
            .ok_or(ServiceError::ProviderNotConfigured(id))
    }
}
