use axum::Router;

use crate::state::SharedState;

pub mod docs;
mod extract;
pub mod games;
pub mod health;
pub mod providers;
pub mod taxonomy;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(games::router())
        .merge(taxonomy::router())
        .merge(providers::router());

    api_router.merge(docs::router()).with_state(state)
}
