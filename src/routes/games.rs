use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dto::catalog::{ActionResponse, CreateGameResponse, GameInput, GameSummary},
    error::{AppError, ErrorBody},
    routes::extract::{JsonBody, PathParams},
    services::catalog_service,
    state::SharedState,
};

/// Routes of the local game catalog.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route(
            "/games/{id}",
            get(get_game).put(update_game).delete(delete_game),
        )
}

/// List every game sorted by title.
#[utoipa::path(
    get,
    path = "/games",
    tag = "games",
    responses(
        (status = 200, description = "Games sorted by title", body = [GameSummary]),
        (status = 503, description = "Storage unavailable", body = ErrorBody)
    )
)]
pub async fn list_games(
    State(state): State<SharedState>,
) -> Result<Json<Vec<GameSummary>>, AppError> {
    Ok(Json(catalog_service::list_games(&state).await?))
}

/// Fetch one game.
#[utoipa::path(
    get,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses(
        (status = 200, description = "Game found", body = GameSummary),
        (status = 404, description = "Unknown game", body = ErrorBody)
    )
)]
pub async fn get_game(
    State(state): State<SharedState>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(catalog_service::get_game(&state, id).await?))
}

/// Create a game, or merge its owned platforms into the game with the same title.
#[utoipa::path(
    post,
    path = "/games",
    tag = "games",
    request_body = GameInput,
    responses(
        (status = 200, description = "Game created, merged or unchanged", body = CreateGameResponse),
        (status = 400, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<GameInput>,
) -> Result<Json<CreateGameResponse>, AppError> {
    Ok(Json(catalog_service::create_game(&state, payload).await?))
}

/// Overwrite every editable field of a game.
#[utoipa::path(
    put,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    request_body = GameInput,
    responses(
        (status = 200, description = "Stored game after the update", body = GameSummary),
        (status = 404, description = "Unknown game", body = ErrorBody),
        (status = 409, description = "Title used by another game", body = ErrorBody)
    )
)]
pub async fn update_game(
    State(state): State<SharedState>,
    PathParams(id): PathParams<Uuid>,
    JsonBody(payload): JsonBody<GameInput>,
) -> Result<Json<GameSummary>, AppError> {
    Ok(Json(catalog_service::update_game(&state, id, payload).await?))
}

/// Delete a game. Unknown ids are reported but not treated as errors.
#[utoipa::path(
    delete,
    path = "/games/{id}",
    tag = "games",
    params(("id" = Uuid, Path, description = "Identifier of the game")),
    responses((status = 200, description = "Deletion confirmation", body = ActionResponse))
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(catalog_service::delete_game(&state, id).await?))
}
