//! MobyGames gateway: GET requests authenticated with an `api_key` query parameter.

mod models;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;

use self::models::{
    CoverGroupsEnvelope, GamesEnvelope, GenresEnvelope, GroupsEnvelope, MobyGame, MobyImage,
    PlatformsEnvelope, ScreenshotsEnvelope,
};
use super::{
    MetadataProvider, ProviderId,
    error::{UpstreamError, UpstreamResult},
    http::UpstreamHttp,
    models::{
        GameSearchResult, ImageAsset, ProviderGame, ProviderGenre, ProviderGroup,
        ProviderPlatform,
    },
};
use crate::config::UpstreamSettings;

/// [`MetadataProvider`] backed by the MobyGames v1 API.
#[derive(Clone)]
pub struct MobyProvider {
    http: UpstreamHttp,
    base_url: String,
    api_key: String,
}

impl MobyProvider {
    pub fn new(base_url: &str, api_key: &str, settings: &UpstreamSettings) -> UpstreamResult<Self> {
        Ok(Self {
            http: UpstreamHttp::new(ProviderId::Moby, settings)?,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> UpstreamResult<T>
    where
        T: DeserializeOwned,
    {
        let request = self
            .http
            .client()
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .query(&[("api_key", self.api_key.as_str())]);
        self.http.send(request, true).await
    }

    fn require_platform(platform_id: Option<u64>, what: &str) -> UpstreamResult<u64> {
        platform_id.ok_or_else(|| UpstreamError::InvalidRequest {
            provider: ProviderId::Moby,
            message: format!("platformId is required to list {what}"),
        })
    }

    async fn search_by_title(&self, title: String) -> UpstreamResult<Vec<GameSearchResult>> {
        let envelope: GamesEnvelope = self.get("games", &[("title", title)]).await?;
        Ok(envelope.games.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: u64) -> UpstreamResult<ProviderGame> {
        let game: MobyGame = self.get(&format!("games/{id}"), &[]).await?;
        Ok(game.into())
    }

    async fn list_genres(&self) -> UpstreamResult<Vec<ProviderGenre>> {
        let envelope: GenresEnvelope = self.get("genres", &[]).await?;
        Ok(envelope.genres.into_iter().map(Into::into).collect())
    }

    async fn list_platforms(&self) -> UpstreamResult<Vec<ProviderPlatform>> {
        let envelope: PlatformsEnvelope = self.get("platforms", &[]).await?;
        Ok(envelope.platforms.into_iter().map(Into::into).collect())
    }

    async fn get_covers(&self, game_id: u64, platform_id: Option<u64>) -> UpstreamResult<Vec<ImageAsset>> {
        let platform_id = Self::require_platform(platform_id, "covers")?;
        let envelope: CoverGroupsEnvelope = self
            .get(&format!("games/{game_id}/platforms/{platform_id}/covers"), &[])
            .await?;
        Ok(envelope
            .cover_groups
            .into_iter()
            .flat_map(|group| group.covers)
            .filter_map(MobyImage::into_asset)
            .collect())
    }

    async fn get_screenshots(
        &self,
        game_id: u64,
        platform_id: Option<u64>,
    ) -> UpstreamResult<Vec<ImageAsset>> {
        let platform_id = Self::require_platform(platform_id, "screenshots")?;
        let envelope: ScreenshotsEnvelope = self
            .get(
                &format!("games/{game_id}/platforms/{platform_id}/screenshots"),
                &[],
            )
            .await?;
        Ok(envelope
            .screenshots
            .into_iter()
            .filter_map(MobyImage::into_asset)
            .collect())
    }

    /// MobyGames has no group search; the listing is filtered locally by name.
    async fn list_groups(&self, name: Option<String>) -> UpstreamResult<Vec<ProviderGroup>> {
        let envelope: GroupsEnvelope = self.get("groups", &[]).await?;
        let needle = name.map(|name| name.to_lowercase());
        Ok(envelope
            .groups
            .into_iter()
            .map(ProviderGroup::from)
            .filter(|group| match &needle {
                Some(needle) => group.name.to_lowercase().contains(needle),
                None => true,
            })
            .collect())
    }
}

impl MetadataProvider for MobyProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Moby
    }

    fn search_by_title(
        &self,
        title: String,
    ) -> BoxFuture<'static, UpstreamResult<Vec<GameSearchResult>>> {
        let provider = self.clone();
        Box::pin(async move { provider.search_by_title(title).await })
    }

    fn get_by_id(&self, id: u64) -> BoxFuture<'static, UpstreamResult<ProviderGame>> {
        let provider = self.clone();
        Box::pin(async move { provider.get_by_id(id).await })
    }

    fn list_genres(&self) -> BoxFuture<'static, UpstreamResult<Vec<ProviderGenre>>> {
        let provider = self.clone();
        Box::pin(async move { provider.list_genres().await })
    }

    fn list_platforms(&self) -> BoxFuture<'static, UpstreamResult<Vec<ProviderPlatform>>> {
        let provider = self.clone();
        Box::pin(async move { provider.list_platforms().await })
    }

    fn get_covers(
        &self,
        game_id: u64,
        platform_id: Option<u64>,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ImageAsset>>> {
        let provider = self.clone();
        Box::pin(async move { provider.get_covers(game_id, platform_id).await })
    }

    fn get_screenshots(
        &self,
        game_id: u64,
        platform_id: Option<u64>,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ImageAsset>>> {
        let provider = self.clone();
        Box::pin(async move { provider.get_screenshots(game_id, platform_id).await })
    }

    fn list_groups(
        &self,
        name: Option<String>,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ProviderGroup>>> {
        let provider = self.clone();
        Box::pin(async move { provider.list_groups(name).await })
    }
}
