//! Proxy routes to the upstream metadata providers, e.g. `/moby/searchGame?title=`.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};

use crate::{
    dao::providers::{
        ProviderId,
        models::{
            GameSearchResult, ImageAsset, ProviderGame, ProviderGenre, ProviderGroup,
            ProviderPlatform,
        },
    },
    dto::provider::{GroupQuery, ImageQuery, SearchGameQuery},
    error::{AppError, ErrorBody},
    routes::extract::{PathParams, QueryParams},
    services::provider_service,
    state::SharedState,
};

/// Routes proxied to IGDB (`igdb`, alias `provider-a`) or MobyGames (`moby`, alias `provider-b`).
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/{provider}/searchGame", get(search_game))
        .route("/{provider}/games/{id}", get(get_game))
        .route("/{provider}/genres", get(list_genres))
        .route("/{provider}/platforms", get(list_platforms))
        .route("/{provider}/covers", get(list_covers))
        .route("/{provider}/screenshots", get(list_screenshots))
        .route("/{provider}/searchGroup", get(search_group))
}

/// Search the provider's catalog by title.
#[utoipa::path(
    get,
    path = "/{provider}/searchGame",
    tag = "providers",
    params(
        ("provider" = ProviderId, Path, description = "Upstream provider"),
        SearchGameQuery
    ),
    responses(
        (status = 200, description = "Matching games", body = [GameSearchResult]),
        (status = 400, description = "Missing or blank title", body = ErrorBody),
        (status = 502, description = "Provider unreachable", body = ErrorBody),
        (status = 503, description = "Provider not configured", body = ErrorBody)
    )
)]
pub async fn search_game(
    State(state): State<SharedState>,
    PathParams(provider): PathParams<ProviderId>,
    QueryParams(query): QueryParams<SearchGameQuery>,
) -> Result<Json<Vec<GameSearchResult>>, AppError> {
    Ok(Json(
        provider_service::search_games(&state, provider, query).await?,
    ))
}

/// Fetch a game by its provider-side identifier.
#[utoipa::path(
    get,
    path = "/{provider}/games/{id}",
    tag = "providers",
    params(
        ("provider" = ProviderId, Path, description = "Upstream provider"),
        ("id" = u64, Path, description = "Provider-side game identifier")
    ),
    responses(
        (status = 200, description = "Game details", body = ProviderGame),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    PathParams((provider, id)): PathParams<(ProviderId, u64)>,
) -> Result<Json<ProviderGame>, AppError> {
    Ok(Json(provider_service::get_game(&state, provider, id).await?))
}

#[utoipa::path(
    get,
    path = "/{provider}/genres",
    tag = "providers",
    params(("provider" = ProviderId, Path, description = "Upstream provider")),
    responses((status = 200, description = "Provider genres", body = [ProviderGenre]))
)]
pub async fn list_genres(
    State(state): State<SharedState>,
    PathParams(provider): PathParams<ProviderId>,
) -> Result<Json<Vec<ProviderGenre>>, AppError> {
    Ok(Json(provider_service::list_genres(&state, provider).await?))
}

#[utoipa::path(
    get,
    path = "/{provider}/platforms",
    tag = "providers",
    params(("provider" = ProviderId, Path, description = "Upstream provider")),
    responses((status = 200, description = "Provider platforms", body = [ProviderPlatform]))
)]
pub async fn list_platforms(
    State(state): State<SharedState>,
    PathParams(provider): PathParams<ProviderId>,
) -> Result<Json<Vec<ProviderPlatform>>, AppError> {
    Ok(Json(
        provider_service::list_platforms(&state, provider).await?,
    ))
}

/// Cover art of a game. MobyGames requires `platformId`.
#[utoipa::path(
    get,
    path = "/{provider}/covers",
    tag = "providers",
    params(
        ("provider" = ProviderId, Path, description = "Upstream provider"),
        ImageQuery
    ),
    responses(
        (status = 200, description = "Covers", body = [ImageAsset]),
        (status = 400, description = "Missing gameId or platformId", body = ErrorBody)
    )
)]
pub async fn list_covers(
    State(state): State<SharedState>,
    PathParams(provider): PathParams<ProviderId>,
    QueryParams(query): QueryParams<ImageQuery>,
) -> Result<Json<Vec<ImageAsset>>, AppError> {
    Ok(Json(provider_service::covers(&state, provider, query).await?))
}

/// Screenshots of a game. MobyGames requires `platformId`.
#[utoipa::path(
    get,
    path = "/{provider}/screenshots",
    tag = "providers",
    params(
        ("provider" = ProviderId, Path, description = "Upstream provider"),
        ImageQuery
    ),
    responses(
        (status = 200, description = "Screenshots", body = [ImageAsset]),
        (status = 400, description = "Missing gameId or platformId", body = ErrorBody)
    )
)]
pub async fn list_screenshots(
    State(state): State<SharedState>,
    PathParams(provider): PathParams<ProviderId>,
    QueryParams(query): QueryParams<ImageQuery>,
) -> Result<Json<Vec<ImageAsset>>, AppError> {
    Ok(Json(
        provider_service::screenshots(&state, provider, query).await?,
    ))
}

/// Search series and collections by name, or list them all.
#[utoipa::path(
    get,
    path = "/{provider}/searchGroup",
    tag = "providers",
    params(
        ("provider" = ProviderId, Path, description = "Upstream provider"),
        GroupQuery
    ),
    responses((status = 200, description = "Matching groups", body = [ProviderGroup]))
)]
pub async fn search_group(
    State(state): State<SharedState>,
    PathParams(provider): PathParams<ProviderId>,
    QueryParams(query): QueryParams<GroupQuery>,
) -> Result<Json<Vec<ProviderGroup>>, AppError> {
    Ok(Json(
        provider_service::search_groups(&state, provider, query).await?,
    ))
}
