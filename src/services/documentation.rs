use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI document for MCDB Back.
#[openapi(
    info(title = "MCDB Back", description = "Video game catalog and metadata proxy"),
    paths(
        crate::routes::health::root,
        crate::routes::health::healthcheck,
        crate::routes::games::list_games,
        crate::routes::games::get_game,
        crate::routes::games::create_game,
        crate::routes::games::update_game,
        crate::routes::games::delete_game,
        crate::routes::taxonomy::list_platforms,
        crate::routes::taxonomy::get_platform,
        crate::routes::taxonomy::create_platform,
        crate::routes::taxonomy::update_platform,
        crate::routes::taxonomy::delete_platform,
        crate::routes::taxonomy::list_genres,
        crate::routes::taxonomy::get_genre,
        crate::routes::taxonomy::create_genre,
        crate::routes::taxonomy::update_genre,
        crate::routes::taxonomy::delete_genre,
        crate::routes::providers::search_game,
        crate::routes::providers::get_game,
        crate::routes::providers::list_genres,
        crate::routes::providers::list_platforms,
        crate::routes::providers::list_covers,
        crate::routes::providers::list_screenshots,
        crate::routes::providers::search_group,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::ServiceStatus,
            crate::dto::catalog::GameInput,
            crate::dto::catalog::GameSummary,
            crate::dto::catalog::CreateGameResponse,
            crate::dto::catalog::MergeOutcome,
            crate::dto::catalog::TaxonomyInput,
            crate::dto::catalog::TaxonomySummary,
            crate::dto::catalog::ActionResponse,
            crate::dao::providers::ProviderId,
            crate::dao::providers::models::GameSearchResult,
            crate::dao::providers::models::ProviderGame,
            crate::dao::providers::models::ProviderPlatform,
            crate::dao::providers::models::ProviderGenre,
            crate::dao::providers::models::ImageAsset,
            crate::dao::providers::models::ProviderGroup,
            crate::error::ErrorBody,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Local game catalog"),
        (name = "platforms", description = "Local platform list"),
        (name = "genres", description = "Local genre list"),
        (name = "providers", description = "IGDB and MobyGames proxy"),
    )
)]
pub struct ApiDoc;
