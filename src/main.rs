//! MCDB Back binary entrypoint wiring the REST API, the catalog store and the upstream providers.

use std::{fs, net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Subscriber, error, info, warn};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use mcdb_back::{
    config::{AppConfig, LoggingSettings, StorageBackend},
    dao::{catalog_store::memory::MemoryCatalogStore, providers::ProviderRegistry},
    routes,
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Console-only logging while the configuration, which names the log directory, loads.
    let config = tracing::subscriber::with_default(console_subscriber(), AppConfig::load);
    let _log_guard = init_tracing(&config.logging)?;
    let providers =
        ProviderRegistry::from_config(&config).context("building upstream provider clients")?;
    let app_state = AppState::new(providers);

    start_storage(&app_state, &config).await;

    // Build the HTTP router once the shared state is ready.
    let app = build_router(app_state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    if let Some(store) = app_state.catalog_store().await {
        store.close().await;
    }
    info!("server stopped");

    Ok(())
}

/// Install the configured catalog store, supervising MongoDB in the background.
async fn start_storage(state: &SharedState, config: &AppConfig) {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("using in-memory catalog store; data is lost on restart");
            state
                .install_catalog_store(Arc::new(MemoryCatalogStore::new()))
                .await;
        }
        StorageBackend::Mongo => start_mongo_supervisor(state, config).await,
    }
}

#[cfg(feature = "mongo-store")]
async fn start_mongo_supervisor(state: &SharedState, config: &AppConfig) {
    use mcdb_back::{
        dao::{
            catalog_store::{
                CatalogStore,
                mongodb::{MongoCatalogStore, MongoConfig},
            },
            storage::StorageError,
        },
        services::storage_supervisor::{self, Backoff},
    };

    let settings = config.storage.mongo.clone();
    let connect = move || {
        let settings = settings.clone();
        async move {
            let mongo_config = MongoConfig::from_settings(&settings)
                .await
                .map_err(StorageError::from)?;
            let store = MongoCatalogStore::connect(mongo_config)
                .await
                .map_err(StorageError::from)?;
            Ok::<_, StorageError>(Arc::new(store) as Arc<dyn CatalogStore>)
        }
    };

    tokio::spawn(storage_supervisor::run(
        state.clone(),
        Backoff::default(),
        connect,
    ));
}

#[cfg(not(feature = "mongo-store"))]
async fn start_mongo_supervisor(state: &SharedState, _config: &AppConfig) {
    warn!("built without MongoDB support; falling back to the in-memory catalog store");
    state
        .install_catalog_store(Arc::new(MemoryCatalogStore::new()))
        .await;
}

/// Build the top-level router and attach cross-cutting middleware layers.
fn build_router(state: SharedState) -> Router<()> {
    routes::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,tower_http=debug".into())
}

fn console_subscriber() -> impl Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
}

/// Install console logging plus, when a directory is configured, a daily-rotated JSON file.
///
/// The returned guard flushes the file writer on drop and must live until shutdown.
fn init_tracing(settings: &LoggingSettings) -> anyhow::Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match settings.directory() {
        Some(directory) => {
            fs::create_dir_all(directory)
                .with_context(|| format!("creating log directory {}", directory.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(&settings.file_prefix)
                .filename_suffix("log")
                .max_log_files(settings.max_files)
                .build(directory)
                .context("creating rolling log file")?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_current_span(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer())
        .with(file_layer)
        .init();
    Ok(guard)
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler; waiting for Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
