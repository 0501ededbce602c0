//! IGDB gateway: every call is a POST carrying an Apicalypse query.

mod models;
mod query;

use futures::future::BoxFuture;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::debug;

use self::{
    models::{IgdbCollection, IgdbGame, IgdbGenre, IgdbImage, IgdbPlatform},
    query::Query,
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

const SEARCH_LIMIT: u32 = 50;
const LISTING_LIMIT: u32 = 500;

/// [`MetadataProvider`] backed by the IGDB v4 API.
#[derive(Clone)]
pub struct IgdbProvider {
    http: UpstreamHttp,
    base_url: String,
    client_id: String,
    access_token: String,
}

impl IgdbProvider {
    pub fn new(
        base_url: &str,
        client_id: &str,
        access_token: &str,
        settings: &UpstreamSettings,
    ) -> UpstreamResult<Self> {
        Ok(Self {
            http: UpstreamHttp::new(ProviderId::Igdb, settings)?,
            base_url: base_url.trim_end_matches('/').to_owned(),
            client_id: client_id.to_owned(),
            access_token: access_token.to_owned(),
        })
    }

    /// POST `query` to `endpoint`. Queries are sent once: POST is not retried.
    async fn query<T>(&self, endpoint: &str, query: Query) -> UpstreamResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let body = query.build();
        debug!(endpoint, %body, "IGDB query");
        let request = self
            .http
            .client()
            .post(format!("{}/{endpoint}", self.base_url))
            .header("Client-ID", &self.client_id)
            .bearer_auth(&self.access_token)
            .header(ACCEPT, "application/json")
            .body(body);
        self.http.send(request, false).await
    }

    async fn search_by_title(&self, title: String) -> UpstreamResult<Vec<GameSearchResult>> {
        let query = Query::fields("name, cover.url")
            .search(&title)
            .limit(SEARCH_LIMIT);
        let games: Vec<IgdbGame> = self.query("games", query).await?;
        Ok(games.into_iter().map(Into::into).collect())
    }

    async fn get_by_id(&self, id: u64) -> UpstreamResult<ProviderGame> {
        let query = Query::fields(
            "name, summary, cover.url, platforms.name, platforms.abbreviation, \
             genres.name, screenshots.url",
        )
        .filter(format!("id = {id}"))
        .limit(1);
        let games: Vec<IgdbGame> = self.query("games", query).await?;
        games
            .into_iter()
            .next()
            .map(Into::into)
            .ok_or_else(|| UpstreamError::NotFound {
                provider: ProviderId::Igdb,
                resource: "game",
                id: id.to_string(),
            })
    }

    async fn list_genres(&self) -> UpstreamResult<Vec<ProviderGenre>> {
        let query = Query::fields("name").sort("name asc").limit(LISTING_LIMIT);
        let genres: Vec<IgdbGenre> = self.query("genres", query).await?;
        Ok(genres.into_iter().map(Into::into).collect())
    }

    async fn list_platforms(&self) -> UpstreamResult<Vec<ProviderPlatform>> {
        let query = Query::fields("name, abbreviation")
            .sort("name asc")
            .limit(LISTING_LIMIT);
        let platforms: Vec<IgdbPlatform> = self.query("platforms", query).await?;
        Ok(platforms.into_iter().map(Into::into).collect())
    }

    async fn images(&self, endpoint: &str, game_id: u64) -> UpstreamResult<Vec<IgdbImage>> {
        let query = Query::fields("url, width, height")
            .filter(format!("game = {game_id}"))
            .limit(LISTING_LIMIT);
        self.query(endpoint, query).await
    }

    async fn get_covers(&self, game_id: u64) -> UpstreamResult<Vec<ImageAsset>> {
        let covers = self.images("covers", game_id).await?;
        Ok(covers.into_iter().filter_map(IgdbImage::into_cover).collect())
    }

    async fn get_screenshots(&self, game_id: u64) -> UpstreamResult<Vec<ImageAsset>> {
        let screenshots = self.images("screenshots", game_id).await?;
        Ok(screenshots
            .into_iter()
            .filter_map(IgdbImage::into_screenshot)
            .collect())
    }

    async fn list_groups(&self, name: Option<String>) -> UpstreamResult<Vec<ProviderGroup>> {
        let query = match name {
            Some(name) => Query::fields("name").search(&name).limit(SEARCH_LIMIT),
            None => Query::fields("name").sort("name asc").limit(SEARCH_LIMIT),
        };
        let collections: Vec<IgdbCollection> = self.query("collections", query).await?;
        Ok(collections.into_iter().map(Into::into).collect())
    }
}

impl MetadataProvider for IgdbProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Igdb
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

    // IGDB images are per game; the platform filter does not apply.
    fn get_covers(
        &self,
        game_id: u64,
        _platform_id: Option<u64>,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ImageAsset>>> {
        let provider = self.clone();
        Box::pin(async move { provider.get_covers(game_id).await })
    }

    fn get_screenshots(
        &self,
        game_id: u64,
        _platform_id: Option<u64>,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ImageAsset>>> {
        let provider = self.clone();
        Box::pin(async move { provider.get_screenshots(game_id).await })
    }

    fn list_groups(
        &self,
        name: Option<String>,
    ) -> BoxFuture<'static, UpstreamResult<Vec<ProviderGroup>>> {
        let provider = self.clone();
        Box::pin(async move { provider.list_groups(name).await })
    }
}
