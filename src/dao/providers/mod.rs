pub mod error;
pub mod http;
pub mod igdb;
pub mod models;
pub mod moby;

use std::{collections::BTreeMap, fmt, sync::Arc};

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::config::AppConfig;

use self::{
    error::UpstreamResult,
    igdb::IgdbProvider,
    models::{
        GameSearchResult, ImageAsset, ProviderGame, ProviderGenre, ProviderGroup,
        ProviderPlatform,
    },
    moby::MobyProvider,
};

/// Upstream metadata provider, as named in request paths.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
pub enum ProviderId {
    /// IGDB, queried with Apicalypse POST bodies.
    #[serde(rename = "igdb", alias = "provider-a")]
    Igdb,
    /// MobyGames, queried with GET and an API key.
    #[serde(rename = "moby", alias = "provider-b")]
    Moby,
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderId::Igdb => f.write_str("IGDB"),
            ProviderId::Moby => f.write_str("MobyGames"),
        }
    }
}

/// Capabilities shared by every upstream gateway. Results are normalized into the
/// records of [`models`].
pub trait MetadataProvider: Send + Sync {
    /// Which provider this gateway talks to.
    fn id(&self) -> ProviderId;
    /// Games whose title matches `title`, with cover and thumbnail urls.
    fn search_by_title(&self, title: String)
    -> BoxFuture<'static, UpstreamResult<Vec<GameSearchResult>>>;
    /// Full record of one game, including platforms and genres.
    fn get_by_id(&self, id: u64) -> BoxFuture<'static, UpstreamResult<ProviderGame>>;
    /// Every genre the provider knows about.
    fn list_genres(&self) -> BoxFuture<'static, UpstreamResult<Vec<ProviderGenre>>>;
    /// Every platform the provider knows about.
    fn list_platforms(&self) -> BoxFuture<'static, UpstreamResult<Vec<ProviderPlatform>>>;
    /// Cover art of a game; some providers require the platform to scope the request.
    fn get_covers(
        &self,
        game_id: u64,
        platform_id: Option<u64>,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ImageAsset>>>;
    /// Screenshots of a game; scoped like [`get_covers`](Self::get_covers).
    fn get_screenshots(
        &self,
        game_id: u64,
        platform_id: Option<u64>,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ImageAsset>>>;
    /// Groups (series, collections) optionally filtered by name.
    fn list_groups(
        &self,
        name: Option<String>,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ProviderGroup>>>;
}

/// Providers available to request handlers, keyed by [`ProviderId`].
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: BTreeMap<ProviderId, Arc<dyn MetadataProvider>>,
}

impl ProviderRegistry {
    /// Register every provider whose credentials are configured.
    pub fn from_config(config: &AppConfig) -> UpstreamResult<Self> {
        let mut registry = Self::default();

        match config.igdb.credentials() {
            Some((client_id, token)) => {
                registry.register(Arc::new(IgdbProvider::new(
                    &config.igdb.base_url,
                    client_id,
                    token,
                    &config.igdb.upstream,
                )?));
                info!(base_url = %config.igdb.base_url, "IGDB provider enabled");
            }
            None => warn!("IGDB credentials missing; provider disabled"),
        }

        match config.moby.api_key() {
            Some(api_key) => {
                registry.register(Arc::new(MobyProvider::new(
                    &config.moby.base_url,
                    api_key,
                    &config.moby.upstream,
                )?));
                info!(base_url = %config.moby.base_url, "MobyGames provider enabled");
            }
            None => warn!("MobyGames API key missing; provider disabled"),
        }

        Ok(registry)
    }

    /// Add or replace the provider registered under its own id.
    pub fn register(&mut self, provider: Arc<dyn MetadataProvider>) {
        self.providers.insert(provider.id(), provider);
    }

    pub fn get(&self, id: ProviderId) -> Option<Arc<dyn MetadataProvider>> {
        self.providers.get(&id).cloned()
    }

    /// Identifiers of the registered providers, in a stable order.
    pub fn configured(&self) -> Vec<ProviderId> {
        self.providers.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_ids_accept_aliases() {
        let parse = |raw: &str| serde_json::from_value::<ProviderId>(serde_json::json!(raw));
        assert_eq!(parse("igdb").unwrap(), ProviderId::Igdb);
        assert_eq!(parse("provider-a").unwrap(), ProviderId::Igdb);
        assert_eq!(parse("moby").unwrap(), ProviderId::Moby);
        assert_eq!(parse("provider-b").unwrap(), ProviderId::Moby);
        assert!(parse("steam").is_err());
    }

    #[test]
    fn registry_only_holds_configured_providers() {
        let mut config = AppConfig::default();
        config.moby.api_key = Some("key".into());

        let registry = ProviderRegistry::from_config(&config).unwrap();
        assert_eq!(registry.configured(), vec![ProviderId::Moby]);
        assert!(registry.get(ProviderId::Igdb).is_none());
    }
}
