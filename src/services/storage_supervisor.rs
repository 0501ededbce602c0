//! Background task owning the catalog store connection and the degraded flag.

use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{catalog_store::CatalogStore, storage::StorageError},
    state::SharedState,
};

const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const RECONNECT_ATTEMPTS: u32 = 3;

/// Doubling delay between connection attempts, capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    /// Start at `initial`, never exceeding `max`.
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Sleep for the current delay, then double it.
    async fn wait(&mut self) {
        sleep(self.current).await;
        self.current = (self.current * 2).min(self.max);
    }

    fn reset(&mut self) {
        self.current = self.initial;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(10))
    }
}

/// Connect with `connect`, install the store, and watch it for the lifetime of the process.
///
/// The shared state stays degraded until a connection succeeds, and flips back to degraded
/// whenever the store stops answering pings and cannot be reconnected right away.
pub async fn run<F, Fut>(state: SharedState, mut backoff: Backoff, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn CatalogStore>, StorageError>> + Send,
{
    loop {
        let store = match connect().await {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, "catalog store connection failed");
                backoff.wait().await;
                continue;
            }
        };

        state.install_catalog_store(store.clone()).await;
        info!("catalog store connected");
        backoff.reset();

        watch_health(&state, store.as_ref(), &backoff).await;
        warn!("catalog store lost; reconnecting from scratch");
        if let Some(stale) = state.clear_catalog_store().await {
            stale.close().await;
        }
        backoff.wait().await;
    }
}

/// Ping the store periodically. Returns once the store cannot be recovered in place.
async fn watch_health(state: &SharedState, store: &dyn CatalogStore, backoff: &Backoff) {
    loop {
        sleep(HEALTH_POLL_INTERVAL).await;
        let Err(err) = store.health_check().await else {
            if state.is_degraded() {
                info!("catalog store answering pings again");
                state.update_degraded(false);
            }
            continue;
        };

        warn!(error = %err, "catalog store ping failed");
        if !reconnect_in_place(state, store, backoff.clone()).await {
            return;
        }
        state.update_degraded(false);
    }
}

async fn reconnect_in_place(
    state: &SharedState,
    store: &dyn CatalogStore,
    mut backoff: Backoff,
) -> bool {
    for attempt in 1..=RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "catalog store reconnected");
                return true;
            }
            Err(err) => {
                warn!(attempt, error = %err, "catalog store reconnect failed");
                state.update_degraded(true);
                backoff.wait().await;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;
    use crate::{
        dao::{catalog_store::memory::MemoryCatalogStore, providers::ProviderRegistry},
        state::AppState,
    };

    #[tokio::test]
    async fn stays_degraded_until_a_connection_succeeds() {
        let state = AppState::new(ProviderRegistry::default());
        assert!(state.is_degraded());

        let mut attempts = 0;
        let backoff = Backoff::new(Duration::from_millis(5), Duration::from_millis(20));
        let supervisor = tokio::spawn(run(state.clone(), backoff, move || {
            attempts += 1;
            let failing = attempts < 3;
            async move {
                if failing {
                    Err(StorageError::unavailable(
                        "connection refused",
                        std::io::Error::other("refused"),
                    ))
                } else {
                    Ok(Arc::new(MemoryCatalogStore::new()) as Arc<dyn CatalogStore>)
                }
            }
        }));

        let mut watcher = state.degraded_watcher();
        watcher.wait_for(|degraded| !degraded).await.unwrap();
        assert!(state.catalog_store().await.is_some());

        supervisor.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_doubles_up_to_the_cap() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_millis(250));

        for expected_ms in [100, 200, 250, 250] {
            let started = Instant::now();
            backoff.wait().await;
            assert_eq!(started.elapsed(), Duration::from_millis(expected_ms));
        }

        backoff.reset();
        let started = Instant::now();
        backoff.wait().await;
        assert_eq!(started.elapsed(), Duration::from_millis(100));
    }
}
