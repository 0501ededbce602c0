//! Pass-through calls to the upstream metadata providers.

use validator::Validate;

use crate::{
    dao::providers::{
        ProviderId,
        models::{
            GameSearchResult, ImageAsset, ProviderGame, ProviderGenre, ProviderGroup,
            ProviderPlatform,
        },
    },
    dto::provider::{GroupQuery, ImageQuery, SearchGameQuery},
    error::ServiceError,
    state::SharedState,
};

pub async fn search_games(
    state: &SharedState,
    provider: ProviderId,
    query: SearchGameQuery,
) -> Result<Vec<GameSearchResult>, ServiceError> {
    query.validate()?;
    let gateway = state.require_provider(provider)?;
    Ok(gateway
        .search_by_title(query.title.trim().to_owned())
        .await?)
}

pub async fn get_game(
    state: &SharedState,
    provider: ProviderId,
    id: u64,
) -> Result<ProviderGame, ServiceError> {
    let gateway = state.require_provider(provider)?;
    Ok(gateway.get_by_id(id).await?)
}

pub async fn list_genres(
    state: &SharedState,
    provider: ProviderId,
) -> Result<Vec<ProviderGenre>, ServiceError> {
    let gateway = state.require_provider(provider)?;
    Ok(gateway.list_genres().await?)
}

pub async fn list_platforms(
    state: &SharedState,
    provider: ProviderId,
) -> Result<Vec<ProviderPlatform>, ServiceError> {
    let gateway = state.require_provider(provider)?;
    Ok(gateway.list_platforms().await?)
}

pub async fn covers(
    state: &SharedState,
    provider: ProviderId,
    query: ImageQuery,
) -> Result<Vec<ImageAsset>, ServiceError> {
    let game_id = require_game_id(&query)?;
    let gateway = state.require_provider(provider)?;
    Ok(gateway.get_covers(game_id, query.platform_id).await?)
}

pub async fn screenshots(
    state: &SharedState,
    provider: ProviderId,
    query: ImageQuery,
) -> Result<Vec<ImageAsset>, ServiceError> {
    let game_id = require_game_id(&query)?;
    let gateway = state.require_provider(provider)?;
    Ok(gateway.get_screenshots(game_id, query.platform_id).await?)
}

/// Groups matching `name`, or every group when the filter is blank.
pub async fn search_groups(
    state: &SharedState,
    provider: ProviderId,
    query: GroupQuery,
) -> Result<Vec<ProviderGroup>, ServiceError> {
    let gateway = state.require_provider(provider)?;
    let name = query
        .name
        .map(|name| name.trim().to_owned())
        .filter(|name| !name.is_empty());
    Ok(gateway.list_groups(name).await?)
}

fn require_game_id(query: &ImageQuery) -> Result<u64, ServiceError> {
    query
        .game_id
        .ok_or_else(|| ServiceError::InvalidInput("gameId is required".into()))
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use futures::future::BoxFuture;

    use super::*;
    use crate::{
        dao::providers::{MetadataProvider, ProviderRegistry, error::UpstreamResult},
        state::AppState,
    };

    /// Provider double recording the arguments it receives.
    #[derive(Default)]
    struct RecordingProvider {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingProvider {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl MetadataProvider for RecordingProvider {
        fn id(&self) -> ProviderId {
            ProviderId::Moby
        }

        fn search_by_title(
            &self,
            title: String,
        ) -> BoxFuture<'static, UpstreamResult<Vec<GameSearchResult>>> {
            self.record(format!("search:{title}"));
            Box::pin(async move {
                Ok(vec![GameSearchResult {
                    id: 1,
                    title,
                    cover_url: None,
                    thumbnail_url: None,
                }])
            })
        }

        fn get_by_id(&self, id: u64) -> BoxFuture<'static, UpstreamResult<ProviderGame>> {
            self.record(format!("game:{id}"));
            Box::pin(async move {
                Ok(ProviderGame {
                    id,
                    title: "Chrono Trigger".into(),
                    description: None,
                    cover_url: None,
                    thumbnail_url: None,
                    platforms: Vec::new(),
                    screenshots: Vec::new(),
                    genres: Vec::new(),
                })
            })
        }

        fn list_genres(&self) -> BoxFuture<'static, UpstreamResult<Vec<ProviderGenre>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn list_platforms(&self) -> BoxFuture<'static, UpstreamResult<Vec<ProviderPlatform>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn get_covers(
            &self,
            game_id: u64,
            platform_id: Option<u64>,
        ) -> BoxFuture<'static, UpstreamResult<Vec<ImageAsset>>> {
            self.record(format!("covers:{game_id}:{platform_id:?}"));
            Box::pin(async { Ok(Vec::new()) })
        }

        fn get_screenshots(
            &self,
            game_id: u64,
            platform_id: Option<u64>,
        ) -> BoxFuture<'static, UpstreamResult<Vec<ImageAsset>>> {
            self.record(format!("screenshots:{game_id}:{platform_id:?}"));
            Box::pin(async { Ok(Vec::new()) })
        }

        fn list_groups(
            &self,
            name: Option<String>,
        ) -> BoxFuture<'static, UpstreamResult<Vec<ProviderGroup>>> {
            self.record(format!("groups:{name:?}"));
            Box::pin(async { Ok(Vec::new()) })
        }
    }

    fn state_with(provider: Arc<RecordingProvider>) -> SharedState {
        let mut registry = ProviderRegistry::default();
        registry.register(provider);
        AppState::new(registry)
    }

    #[tokio::test]
    async fn search_trims_title_and_rejects_blank() {
        let provider = Arc::new(RecordingProvider::default());
        let state = state_with(provider.clone());

        let results = search_games(
            &state,
            ProviderId::Moby,
            SearchGameQuery {
                title: "  Chrono Trigger ".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(results[0].title, "Chrono Trigger");

        let err = search_games(&state, ProviderId::Moby, SearchGameQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
        assert_eq!(
            provider.calls.lock().unwrap().as_slice(),
            ["search:Chrono Trigger"]
        );
    }

    #[tokio::test]
    async fn images_require_game_id_and_forward_platform() {
        let provider = Arc::new(RecordingProvider::default());
        let state = state_with(provider.clone());

        let err = covers(&state, ProviderId::Moby, ImageQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));

        screenshots(
            &state,
            ProviderId::Moby,
            ImageQuery {
                game_id: Some(4501),
                platform_id: Some(15),
            },
        )
        .await
        .unwrap();
        assert_eq!(
            provider.calls.lock().unwrap().as_slice(),
            ["screenshots:4501:Some(15)"]
        );
    }

    #[tokio::test]
    async fn blank_group_filter_lists_everything() {
        let provider = Arc::new(RecordingProvider::default());
        let state = state_with(provider.clone());

        search_groups(
            &state,
            ProviderId::Moby,
            GroupQuery {
                name: Some("   ".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(provider.calls.lock().unwrap().as_slice(), ["groups:None"]);
    }

    #[tokio::test]
    async fn unregistered_provider_is_not_configured() {
        let state = state_with(Arc::new(RecordingProvider::default()));
        let err = get_game(&state, ProviderId::Igdb, 1).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::ProviderNotConfigured(ProviderId::Igdb)
        ));
    }
}
