pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use std::time::SystemTime;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{GameEntity, GameFields, TaxonomyEntity, TaxonomyKind};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for the local catalog.
///
/// Listings are sorted by title (games) or name (taxonomy entries) ascending.
/// Inserts and renames that collide with an existing title or name fail with
/// [`StorageError::Conflict`](crate::dao::storage::StorageError::Conflict).
/// Update and delete operations report whether a document matched the id.
pub trait CatalogStore: Send + Sync {
    /// Every game in the catalog, sorted by title.
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;
    /// Game with the given id, or `None` when absent.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Game whose title matches exactly; used for uniqueness checks.
    fn find_game_by_title(
        &self,
        title: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// Store a new game; a duplicate title yields a conflict.
    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Overwrite every editable field; `created_at` is left untouched.
    fn update_game(
        &self,
        id: Uuid,
        fields: GameFields,
        modified_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Add each platform to `owned_platforms` unless already present.
    fn add_owned_platforms(
        &self,
        id: Uuid,
        platforms: Vec<String>,
        modified_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Remove a game; `false` when nothing matched.
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;

    /// Entries of one taxonomy collection, sorted by name.
    fn list_taxonomy(
        &self,
        kind: TaxonomyKind,
    ) -> BoxFuture<'static, StorageResult<Vec<TaxonomyEntity>>>;
    /// Entry with the given id in the `kind` collection.
    fn find_taxonomy(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TaxonomyEntity>>>;
    /// Entry whose name matches exactly in the `kind` collection.
    fn find_taxonomy_by_name(
        &self,
        kind: TaxonomyKind,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<TaxonomyEntity>>>;
    /// Store a new entry; a duplicate name within `kind` yields a conflict.
    fn insert_taxonomy(
        &self,
        kind: TaxonomyKind,
        entry: TaxonomyEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Replace name and description of an existing entry.
    fn update_taxonomy(
        &self,
        kind: TaxonomyKind,
        entry: TaxonomyEntity,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Remove an entry; `false` when nothing matched.
    fn delete_taxonomy(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>>;

    /// Cheap round-trip against the backend, used by the health endpoint.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the backend connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Release the underlying connections at process shutdown.
    fn close(&self) -> BoxFuture<'static, ()>;
}
