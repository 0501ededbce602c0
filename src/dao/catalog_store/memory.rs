//! In-process [`CatalogStore`] used for local development and tests.

use std::{collections::HashMap, sync::Arc, time::SystemTime};

use futures::future::BoxFuture;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::dao::{
    catalog_store::CatalogStore,
    models::{GameEntity, GameFields, TaxonomyEntity, TaxonomyKind},
    storage::{StorageError, StorageResult},
};

/// Catalog store keeping every collection in memory behind a single lock, so
/// uniqueness checks and writes are atomic with respect to each other.
#[derive(Clone, Default)]
pub struct MemoryCatalogStore {
    inner: Arc<RwLock<Collections>>,
}

#[derive(Default)]
struct Collections {
    games: HashMap<Uuid, GameEntity>,
    platforms: HashMap<Uuid, TaxonomyEntity>,
    genres: HashMap<Uuid, TaxonomyEntity>,
}

impl Collections {
    fn taxonomy(&self, kind: TaxonomyKind) -> &HashMap<Uuid, TaxonomyEntity> {
        match kind {
            TaxonomyKind::Platform => &self.platforms,
            TaxonomyKind::Genre => &self.genres,
        }
    }

    fn taxonomy_mut(&mut self, kind: TaxonomyKind) -> &mut HashMap<Uuid, TaxonomyEntity> {
        match kind {
            TaxonomyKind::Platform => &mut self.platforms,
            TaxonomyKind::Genre => &mut self.genres,
        }
    }

    fn title_taken(&self, title: &str, exclude: Option<Uuid>) -> bool {
        self.games
            .values()
            .any(|game| game.fields.title == title && Some(game.id) != exclude)
    }

    fn name_taken(&self, kind: TaxonomyKind, name: &str, exclude: Option<Uuid>) -> bool {
        self.taxonomy(kind)
            .values()
            .any(|entry| entry.name == name && Some(entry.id) != exclude)
    }
}

impl MemoryCatalogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn duplicate_title(title: &str) -> StorageError {
    StorageError::conflict(format!("a game titled `{title}` already exists"))
}

fn duplicate_name(kind: TaxonomyKind, name: &str) -> StorageError {
    StorageError::conflict(format!("a {kind} named `{name}` already exists"))
}

impl CatalogStore for MemoryCatalogStore {
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.read().await;
            let mut games = guard.games.values().cloned().collect::<Vec<_>>();
            games.sort_by(|a, b| a.fields.title.cmp(&b.fields.title));
            Ok(games)
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.read().await.games.get(&id).cloned()) })
    }

    fn find_game_by_title(
        &self,
        title: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.read().await;
            Ok(guard
                .games
                .values()
                .find(|game| game.fields.title == title)
                .cloned())
        })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            if guard.title_taken(game.title(), None) {
                return Err(duplicate_title(game.title()));
            }
            guard.games.insert(game.id, game);
            Ok(())
        })
    }

    fn update_game(
        &self,
        id: Uuid,
        fields: GameFields,
        modified_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            if !guard.games.contains_key(&id) {
                return Ok(false);
            }
            if guard.title_taken(&fields.title, Some(id)) {
                return Err(duplicate_title(&fields.title));
            }
            if let Some(game) = guard.games.get_mut(&id) {
                game.fields = fields;
                game.modified_at = Some(modified_at);
            }
            Ok(true)
        })
    }

    fn add_owned_platforms(
        &self,
        id: Uuid,
        platforms: Vec<String>,
        modified_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            let Some(game) = guard.games.get_mut(&id) else {
                return Ok(false);
            };
            for platform in platforms {
                if !game.fields.owned_platforms.contains(&platform) {
                    game.fields.owned_platforms.push(platform);
                }
            }
            game.modified_at = Some(modified_at);
            Ok(true)
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.write().await.games.remove(&id).is_some()) })
    }

    fn list_taxonomy(
        &self,
        kind: TaxonomyKind,
    ) -> BoxFuture<'static, StorageResult<Vec<TaxonomyEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.read().await;
            let mut entries = guard.taxonomy(kind).values().cloned().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(entries)
        })
    }

    fn find_taxonomy(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TaxonomyEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.read().await.taxonomy(kind).get(&id).cloned()) })
    }

    fn find_taxonomy_by_name(
        &self,
        kind: TaxonomyKind,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<TaxonomyEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let guard = inner.read().await;
            Ok(guard
                .taxonomy(kind)
                .values()
                .find(|entry| entry.name == name)
                .cloned())
        })
    }

    fn insert_taxonomy(
        &self,
        kind: TaxonomyKind,
        entry: TaxonomyEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            if guard.name_taken(kind, &entry.name, None) {
                return Err(duplicate_name(kind, &entry.name));
            }
            guard.taxonomy_mut(kind).insert(entry.id, entry);
            Ok(())
        })
    }

    fn update_taxonomy(
        &self,
        kind: TaxonomyKind,
        entry: TaxonomyEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut guard = inner.write().await;
            if !guard.taxonomy(kind).contains_key(&entry.id) {
                return Ok(false);
            }
            if guard.name_taken(kind, &entry.name, Some(entry.id)) {
                return Err(duplicate_name(kind, &entry.name));
            }
            guard.taxonomy_mut(kind).insert(entry.id, entry);
            Ok(true)
        })
    }

    fn delete_taxonomy(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let inner = self.inner.clone();
        Box::pin(async move { Ok(inner.write().await.taxonomy_mut(kind).remove(&id).is_some()) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn close(&self) -> BoxFuture<'static, ()> {
        Box::pin(async {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(title: &str, owned: &[&str]) -> GameEntity {
        GameEntity::new(
            GameFields {
                title: title.into(),
                owned_platforms: owned.iter().map(|p| p.to_string()).collect(),
                ..GameFields::default()
            },
            SystemTime::now(),
        )
    }

    fn entry(name: &str) -> TaxonomyEntity {
        TaxonomyEntity {
            id: Uuid::new_v4(),
            name: name.into(),
            abbreviation: None,
        }
    }

    #[tokio::test]
    async fn games_are_listed_by_title() {
        let store = MemoryCatalogStore::new();
        for title in ["Zelda", "Chrono Trigger", "Metroid"] {
            store.insert_game(game(title, &[])).await.unwrap();
        }

        let titles = store
            .list_games()
            .await
            .unwrap()
            .into_iter()
            .map(|game| game.fields.title)
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Chrono Trigger", "Metroid", "Zelda"]);
    }

    #[tokio::test]
    async fn duplicate_title_is_a_conflict() {
        let store = MemoryCatalogStore::new();
        store.insert_game(game("Chrono Trigger", &[])).await.unwrap();

        let err = store
            .insert_game(game("Chrono Trigger", &[]))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
        assert_eq!(store.list_games().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_owned_platforms_skips_existing_entries() {
        let store = MemoryCatalogStore::new();
        let stored = game("Chrono Trigger", &["SNES"]);
        let id = stored.id;
        store.insert_game(stored).await.unwrap();

        let matched = store
            .add_owned_platforms(id, vec!["SNES".into(), "DS".into()], SystemTime::now())
            .await
            .unwrap();
        assert!(matched);

        let game = store.find_game(id).await.unwrap().unwrap();
        assert_eq!(game.fields.owned_platforms, vec!["SNES", "DS"]);
        assert!(game.modified_at.is_some());
    }

    #[tokio::test]
    async fn update_game_rejects_title_of_another_game() {
        let store = MemoryCatalogStore::new();
        let first = game("Chrono Trigger", &[]);
        let second = game("Chrono Cross", &[]);
        let second_id = second.id;
        store.insert_game(first).await.unwrap();
        store.insert_game(second).await.unwrap();

        let fields = GameFields {
            title: "Chrono Trigger".into(),
            ..GameFields::default()
        };
        let err = store
            .update_game(second_id, fields, SystemTime::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
    }

    #[tokio::test]
    async fn update_missing_game_reports_no_match() {
        let store = MemoryCatalogStore::new();
        let matched = store
            .update_game(Uuid::new_v4(), GameFields::default(), SystemTime::now())
            .await
            .unwrap();
        assert!(!matched);
    }

    #[tokio::test]
    async fn delete_missing_entries_is_harmless() {
        let store = MemoryCatalogStore::new();
        store.insert_game(game("Metroid", &[])).await.unwrap();

        assert!(!store.delete_game(Uuid::new_v4()).await.unwrap());
        assert!(
            !store
                .delete_taxonomy(TaxonomyKind::Genre, Uuid::new_v4())
                .await
                .unwrap()
        );
        assert_eq!(store.list_games().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn taxonomy_kinds_are_isolated() {
        let store = MemoryCatalogStore::new();
        store
            .insert_taxonomy(TaxonomyKind::Platform, entry("Action"))
            .await
            .unwrap();
        store
            .insert_taxonomy(TaxonomyKind::Genre, entry("Action"))
            .await
            .unwrap();

        let err = store
            .insert_taxonomy(TaxonomyKind::Genre, entry("Action"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));
        assert_eq!(
            store
                .list_taxonomy(TaxonomyKind::Platform)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
