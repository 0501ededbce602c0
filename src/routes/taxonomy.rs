//! Platform and genre routes.

use axum::{
    Json, Router,
    extract::State,
    routing::get,
};
use uuid::Uuid;

use crate::{
    dao::models::TaxonomyKind,
    dto::catalog::{ActionResponse, TaxonomyInput, TaxonomySummary},
    error::{AppError, ErrorBody},
    routes::extract::{JsonBody, PathParams},
    services::taxonomy_service,
    state::SharedState,
};

/// Routes of the local platform and genre collections.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/platforms", get(list_platforms).post(create_platform))
        .route(
            "/platforms/{id}",
            get(get_platform).put(update_platform).delete(delete_platform),
        )
        .route("/gameGenres", get(list_genres).post(create_genre))
        .route(
            "/gameGenres/{id}",
            get(get_genre).put(update_genre).delete(delete_genre),
        )
}

/// List every platform sorted by name.
#[utoipa::path(
    get,
    path = "/platforms",
    tag = "platforms",
    responses((status = 200, description = "Entries sorted by name", body = [TaxonomySummary]))
)]
pub async fn list_platforms(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TaxonomySummary>>, AppError> {
    Ok(Json(taxonomy_service::list(&state, TaxonomyKind::Platform).await?))
}

/// Fetch one platform.
#[utoipa::path(
    get,
    path = "/platforms/{id}",
    tag = "platforms",
    params(("id" = Uuid, Path, description = "Identifier of the platform")),
    responses(
        (status = 200, description = "Entry found", body = TaxonomySummary),
        (status = 404, description = "Unknown platform", body = ErrorBody)
    )
)]
pub async fn get_platform(
    State(state): State<SharedState>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<TaxonomySummary>, AppError> {
    Ok(Json(taxonomy_service::get(&state, TaxonomyKind::Platform, id).await?))
}

/// Create a platform whose name is not used yet.
#[utoipa::path(
    post,
    path = "/platforms",
    tag = "platforms",
    request_body = TaxonomyInput,
    responses(
        (status = 200, description = "Entry created", body = TaxonomySummary),
        (status = 409, description = "Name already used", body = ErrorBody)
    )
)]
pub async fn create_platform(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<TaxonomyInput>,
) -> Result<Json<TaxonomySummary>, AppError> {
    Ok(Json(taxonomy_service::create(&state, TaxonomyKind::Platform, payload).await?))
}

/// Overwrite a platform.
#[utoipa::path(
    put,
    path = "/platforms/{id}",
    tag = "platforms",
    params(("id" = Uuid, Path, description = "Identifier of the platform")),
    request_body = TaxonomyInput,
    responses(
        (status = 200, description = "Entry after the update", body = TaxonomySummary),
        (status = 404, description = "Unknown platform", body = ErrorBody),
        (status = 409, description = "Name already used", body = ErrorBody)
    )
)]
pub async fn update_platform(
    State(state): State<SharedState>,
    PathParams(id): PathParams<Uuid>,
    JsonBody(payload): JsonBody<TaxonomyInput>,
) -> Result<Json<TaxonomySummary>, AppError> {
    Ok(Json(
        taxonomy_service::update(&state, TaxonomyKind::Platform, id, payload).await?,
    ))
}

/// Delete a platform; games referencing it are left untouched.
#[utoipa::path(
    delete,
    path = "/platforms/{id}",
    tag = "platforms",
    params(("id" = Uuid, Path, description = "Identifier of the platform")),
    responses((status = 200, description = "Deletion confirmation", body = ActionResponse))
)]
pub async fn delete_platform(
    State(state): State<SharedState>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(taxonomy_service::delete(&state, TaxonomyKind::Platform, id).await?))
}

/// List every genre sorted by name.
#[utoipa::path(
    get,
    path = "/gameGenres",
    tag = "genres",
    responses((status = 200, description = "Entries sorted by name", body = [TaxonomySummary]))
)]
pub async fn list_genres(
    State(state): State<SharedState>,
) -> Result<Json<Vec<TaxonomySummary>>, AppError> {
    Ok(Json(taxonomy_service::list(&state, TaxonomyKind::Genre).await?))
}

/// Fetch one genre.
#[utoipa::path(
    get,
    path = "/gameGenres/{id}",
    tag = "genres",
    params(("id" = Uuid, Path, description = "Identifier of the genre")),
    responses(
        (status = 200, description = "Entry found", body = TaxonomySummary),
        (status = 404, description = "Unknown genre", body = ErrorBody)
    )
)]
pub async fn get_genre(
    State(state): State<SharedState>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<TaxonomySummary>, AppError> {
    Ok(Json(taxonomy_service::get(&state, TaxonomyKind::Genre, id).await?))
}

/// Create a genre whose name is not used yet.
#[utoipa::path(
    post,
    path = "/gameGenres",
    tag = "genres",
    request_body = TaxonomyInput,
    responses(
        (status = 200, description = "Entry created", body = TaxonomySummary),
        (status = 409, description = "Name already used", body = ErrorBody)
    )
)]
pub async fn create_genre(
    State(state): State<SharedState>,
    JsonBody(payload): JsonBody<TaxonomyInput>,
) -> Result<Json<TaxonomySummary>, AppError> {
    Ok(Json(taxonomy_service::create(&state, TaxonomyKind::Genre, payload).await?))
}

/// Overwrite a genre.
#[utoipa::path(
    put,
    path = "/gameGenres/{id}",
    tag = "genres",
    params(("id" = Uuid, Path, description = "Identifier of the genre")),
    request_body = TaxonomyInput,
    responses(
        (status = 200, description = "Entry after the update", body = TaxonomySummary),
        (status = 404, description = "Unknown genre", body = ErrorBody),
        (status = 409, description = "Name already used", body = ErrorBody)
    )
)]
pub async fn update_genre(
    State(state): State<SharedState>,
    PathParams(id): PathParams<Uuid>,
    JsonBody(payload): JsonBody<TaxonomyInput>,
) -> Result<Json<TaxonomySummary>, AppError> {
    Ok(Json(
        taxonomy_service::update(&state, TaxonomyKind::Genre, id, payload).await?,
    ))
}

/// Delete a genre; games referencing it are left untouched.
#[utoipa::path(
    delete,
    path = "/gameGenres/{id}",
    tag = "genres",
    params(("id" = Uuid, Path, description = "Identifier of the genre")),
    responses((status = 200, description = "Deletion confirmation", body = ActionResponse))
)]
pub async fn delete_genre(
    State(state): State<SharedState>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<ActionResponse>, AppError> {
    Ok(Json(taxonomy_service::delete(&state, TaxonomyKind::Genre, id).await?))
}
