use axum::{Json, Router, extract::State, routing::get};

use crate::{dto::health::HealthResponse, services::health_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "health",
    responses((status = 200, description = "Liveness plus catalog store reachability", body = HealthResponse))
)]
/// Liveness plus a round-trip to the catalog store.
pub async fn healthcheck(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(health_service::health_status(&state).await)
}

/// Plain-text liveness answer at the root path.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses((status = 200, description = "The process is up", body = String, content_type = "text/plain"))
)]
pub async fn root() -> &'static str {
    "App is working"
}

/// Liveness routes: `/` and `/healthcheck`.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(root))
        .route("/healthcheck", get(healthcheck))
}
