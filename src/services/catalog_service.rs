use std::{
    collections::HashSet,
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use indexmap::IndexSet;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dao::{
        catalog_store::CatalogStore,
        models::{GameEntity, GameFields},
    },
    dto::catalog::{ActionResponse, CreateGameResponse, GameInput, GameSummary, MergeOutcome},
    error::ServiceError,
    state::SharedState,
};

/// All games sorted by title.
pub async fn list_games(state: &SharedState) -> Result<Vec<GameSummary>, ServiceError> {
    let store = state.require_catalog_store().await?;
    let games = store.list_games().await?;
    Ok(games.into_iter().map(Into::into).collect())
}

pub async fn get_game(state: &SharedState, id: Uuid) -> Result<GameSummary, ServiceError> {
    let store = state.require_catalog_store().await?;
    let Some(game) = store.find_game(id).await? else {
        return Err(game_not_found(id));
    };
    Ok(game.into())
}

/// Insert a game, or merge its owned platforms into the game already using its title.
pub async fn create_game(
    state: &SharedState,
    input: GameInput,
) -> Result<CreateGameResponse, ServiceError> {
    input.validate()?;
    let fields = game_fields(input);
    let store = state.require_catalog_store().await?;

    if let Some(existing) = store.find_game_by_title(fields.title.clone()).await? {
        return merge_owned_platforms(&store, existing, fields.owned_platforms).await;
    }

    let game = GameEntity::new(fields, write_timestamp());
    let id = game.id;
    let title = game.fields.title.clone();
    let owned_platforms = game.fields.owned_platforms.clone();

    match store.insert_game(game).await {
        Ok(()) => {
            info!(%id, %title, "game created");
            Ok(CreateGameResponse::new(
                id,
                &title,
                MergeOutcome::Created,
                owned_platforms,
            ))
        }
        Err(err) if err.is_conflict() => {
            // Lost the insert race to a concurrent create: merge into the winner.
            debug!(%title, "concurrent insert detected; merging into existing game");
            let Some(existing) = store.find_game_by_title(title.clone()).await? else {
                return Err(ServiceError::Conflict(format!(
                    "game `{title}` was modified concurrently"
                )));
            };
            merge_owned_platforms(&store, existing, owned_platforms).await
        }
        Err(err) => Err(err.into()),
    }
}

/// Overwrite every editable field of a game.
pub async fn update_game(
    state: &SharedState,
    id: Uuid,
    input: GameInput,
) -> Result<GameSummary, ServiceError> {
    input.validate()?;
    let fields = game_fields(input);
    let store = state.require_catalog_store().await?;

    if !store.update_game(id, fields, write_timestamp()).await? {
        return Err(game_not_found(id));
    }
    info!(%id, "game updated");

    let Some(game) = store.find_game(id).await? else {
        return Err(game_not_found(id));
    };
    Ok(game.into())
}

/// Delete a game; deleting an unknown id succeeds without effect.
pub async fn delete_game(state: &SharedState, id: Uuid) -> Result<ActionResponse, ServiceError> {
    let store = state.require_catalog_store().await?;
    if store.delete_game(id).await? {
        info!(%id, "game deleted");
        Ok(ActionResponse::new(format!("game `{id}` deleted")))
    } else {
        Ok(ActionResponse::new(format!(
            "game `{id}` not found; nothing to delete"
        )))
    }
}

async fn merge_owned_platforms(
    store: &Arc<dyn CatalogStore>,
    existing: GameEntity,
    incoming: Vec<String>,
) -> Result<CreateGameResponse, ServiceError> {
    let to_add = missing_platforms(&incoming, &existing.fields.owned_platforms);
    if to_add.is_empty() {
        return Ok(CreateGameResponse::new(
            existing.id,
            existing.title(),
            MergeOutcome::Unchanged,
            Vec::new(),
        ));
    }

    if !store
        .add_owned_platforms(existing.id, to_add.clone(), write_timestamp())
        .await?
    {
        return Err(game_not_found(existing.id));
    }
    info!(id = %existing.id, added = ?to_add, "owned platforms merged");

    Ok(CreateGameResponse::new(
        existing.id,
        existing.title(),
        MergeOutcome::Merged,
        to_add,
    ))
}

fn game_fields(input: GameInput) -> GameFields {
    GameFields {
        title: input.title.trim().to_owned(),
        description: input.description,
        cover_url: input.cover_url,
        platforms: input.platforms,
        screenshots: input.screenshots,
        owned_platforms: normalize_platforms(input.owned_platforms),
        genres: input.genres,
    }
}

/// Trim entries, drop blanks and duplicates, keeping first-seen order.
fn normalize_platforms(platforms: Vec<String>) -> Vec<String> {
    platforms
        .into_iter()
        .map(|platform| platform.trim().to_owned())
        .filter(|platform| !platform.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// Entries of `incoming` not already in `existing`, in `incoming` order.
fn missing_platforms(incoming: &[String], existing: &[String]) -> Vec<String> {
    let owned: HashSet<&str> = existing.iter().map(String::as_str).collect();
    incoming
        .iter()
        .filter(|platform| !owned.contains(platform.as_str()))
        .cloned()
        .collect()
}

/// Current time rounded up to whole milliseconds, the precision of stored BSON dates.
///
/// Rounding up keeps a persisted stamp no earlier than any instant observed before the write.
fn write_timestamp() -> SystemTime {
    let now = SystemTime::now();
    let Ok(since_epoch) = now.duration_since(UNIX_EPOCH) else {
        return now;
    };
    match since_epoch.subsec_nanos() % 1_000_000 {
        0 => now,
        sub_millis => now + Duration::from_nanos(u64::from(1_000_000 - sub_millis)),
    }
}

fn game_not_found(id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("game `{id}` not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dao::{catalog_store::memory::MemoryCatalogStore, providers::ProviderRegistry},
        state::AppState,
    };

    async fn state_with_store() -> SharedState {
        let state = AppState::new(ProviderRegistry::default());
        state
            .install_catalog_store(Arc::new(MemoryCatalogStore::new()))
            .await;
        state
    }

    fn input(title: &str, owned: &[&str]) -> GameInput {
        GameInput {
            title: title.into(),
            owned_platforms: owned.iter().map(|p| p.to_string()).collect(),
            ..GameInput::default()
        }
    }

    #[test]
    fn normalize_platforms_trims_and_dedupes() {
        let normalized = normalize_platforms(vec![
            " SNES ".into(),
            "".into(),
            "DS".into(),
            "SNES".into(),
            "  ".into(),
        ]);
        assert_eq!(normalized, vec!["SNES", "DS"]);
    }

    #[test]
    fn write_timestamp_is_whole_millis_and_not_before_now() {
        let before = SystemTime::now();
        let stamp = write_timestamp();
        assert!(stamp >= before);
        let since_epoch = stamp.duration_since(UNIX_EPOCH).unwrap();
        assert_eq!(since_epoch.subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn missing_platforms_keeps_incoming_order() {
        let existing = vec!["SNES".to_string(), "PS1".to_string()];
        let incoming = vec!["DS".to_string(), "SNES".to_string(), "3DS".to_string()];
        assert_eq!(missing_platforms(&incoming, &existing), vec!["DS", "3DS"]);
    }

    #[tokio::test]
    async fn second_create_merges_owned_platforms() {
        let state = state_with_store().await;

        let first = create_game(&state, input("Chrono Trigger", &["SNES"]))
            .await
            .unwrap();
        assert_eq!(first.outcome, MergeOutcome::Created);

        let second = create_game(&state, input("Chrono Trigger", &["DS"]))
            .await
            .unwrap();
        assert_eq!(second.outcome, MergeOutcome::Merged);
        assert_eq!(second.id, first.id);
        assert_eq!(second.added_platforms, vec!["DS"]);

        let stored = get_game(&state, first.id).await.unwrap();
        assert_eq!(stored.owned_platforms, vec!["SNES", "DS"]);
        assert!(stored.modified_date.is_some());
        assert_eq!(list_games(&state).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_with_owned_platform_is_unchanged() {
        let state = state_with_store().await;
        let first = create_game(&state, input("Chrono Trigger", &["SNES"]))
            .await
            .unwrap();

        let again = create_game(&state, input("Chrono Trigger", &["SNES", " SNES"]))
            .await
            .unwrap();
        assert_eq!(again.outcome, MergeOutcome::Unchanged);
        assert!(again.added_platforms.is_empty());

        let stored = get_game(&state, first.id).await.unwrap();
        assert_eq!(stored.owned_platforms, vec!["SNES"]);
        assert!(stored.modified_date.is_none());
    }

    #[tokio::test]
    async fn merge_ignores_other_fields() {
        let state = state_with_store().await;
        let mut original = input("Doom", &["PC"]);
        original.description = Some("Rip and tear.".into());
        let created = create_game(&state, original).await.unwrap();

        let mut duplicate = input("Doom", &["PC"]);
        duplicate.description = Some("Something else".into());
        create_game(&state, duplicate).await.unwrap();

        let stored = get_game(&state, created.id).await.unwrap();
        assert_eq!(stored.description.as_deref(), Some("Rip and tear."));
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let state = state_with_store().await;
        let err = create_game(&state, input("  ", &[])).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn update_overwrites_fields_and_stamps_modified_date() {
        let state = state_with_store().await;
        let mut original = input("Chrono Trigger", &["SNES"]);
        original.genres = vec!["RPG".into()];
        let created = create_game(&state, original).await.unwrap();
        let before = get_game(&state, created.id).await.unwrap();

        tokio::time::sleep(Duration::from_millis(5)).await;
        let call_time = SystemTime::now();
        let updated = update_game(
            &state,
            created.id,
            GameInput {
                title: "Chrono Trigger".into(),
                description: Some("Time travel".into()),
                ..GameInput::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.created_date, before.created_date);
        assert_eq!(updated.description.as_deref(), Some("Time travel"));
        assert!(updated.genres.is_empty());
        assert!(updated.owned_platforms.is_empty());

        let store = state.require_catalog_store().await.unwrap();
        let entity = store.find_game(created.id).await.unwrap().unwrap();
        assert!(entity.modified_at.unwrap() >= call_time);
    }

    #[tokio::test]
    async fn update_missing_game_is_not_found() {
        let state = state_with_store().await;
        let err = update_game(&state, Uuid::new_v4(), input("Ghost", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn rename_onto_existing_title_conflicts() {
        let state = state_with_store().await;
        create_game(&state, input("Doom", &[])).await.unwrap();
        let quake = create_game(&state, input("Quake", &[])).await.unwrap();

        let err = update_game(&state, quake.id, input("Doom", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let state = state_with_store().await;
        let created = create_game(&state, input("Doom", &[])).await.unwrap();

        delete_game(&state, created.id).await.unwrap();
        let again = delete_game(&state, created.id).await.unwrap();
        assert!(again.message.contains("nothing to delete"));
        assert!(list_games(&state).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_is_sorted_by_title() {
        let state = state_with_store().await;
        for title in ["Zelda", "Metroid", "Castlevania"] {
            create_game(&state, input(title, &[])).await.unwrap();
        }
        let titles: Vec<String> = list_games(&state)
            .await
            .unwrap()
            .into_iter()
            .map(|game| game.title)
            .collect();
        assert_eq!(titles, vec!["Castlevania", "Metroid", "Zelda"]);
    }

    #[tokio::test]
    async fn degraded_state_is_reported() {
        let state = AppState::new(ProviderRegistry::default());
        let err = list_games(&state).await.unwrap_err();
        assert!(matches!(err, ServiceError::Degraded));
    }
}
