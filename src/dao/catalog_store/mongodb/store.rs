use std::{sync::Arc, time::SystemTime};

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{
    Client, Collection, Database, IndexModel,
    bson::{DateTime, Document, doc},
    options::IndexOptions,
};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::{establish_connection, ping},
    error::{MongoDaoError, MongoResult, is_duplicate_key},
    models::{
        MongoGameDocument, MongoTaxonomyDocument, doc_id, game_fields_update,
        owned_platforms_update,
    },
};
use crate::dao::{
    catalog_store::CatalogStore,
    models::{GameEntity, GameFields, TaxonomyEntity, TaxonomyKind},
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";

/// MongoDB-backed [`CatalogStore`] implementation.
#[derive(Clone)]
pub struct MongoCatalogStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        ping(&database)
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoCatalogStore {
    /// Establish a connection to MongoDB and ensure the unique indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;
        info!(database = %config.database_name, "connected to MongoDB");

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let database = self.database().await;

        let games = database.collection::<Document>(GAME_COLLECTION_NAME);
        games
            .create_index(unique_index("title", "game_title_idx"))
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "title",
                source,
            })?;

        for kind in [TaxonomyKind::Platform, TaxonomyKind::Genre] {
            let collection = kind.collection_name();
            database
                .collection::<Document>(collection)
                .create_index(unique_index("name", "taxonomy_name_idx"))
                .await
                .map_err(|source| MongoDaoError::EnsureIndex {
                    collection,
                    index: "name",
                    source,
                })?;
        }

        Ok(())
    }

    async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    async fn games(&self) -> Collection<MongoGameDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoGameDocument>(GAME_COLLECTION_NAME)
    }

    async fn taxonomy(&self, kind: TaxonomyKind) -> Collection<MongoTaxonomyDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoTaxonomyDocument>(kind.collection_name())
    }

    async fn list_games(&self) -> MongoResult<Vec<GameEntity>> {
        let documents: Vec<MongoGameDocument> = self
            .games()
            .await
            .find(doc! {})
            .sort(doc! {"title": 1})
            .await
            .map_err(|source| list_error(GAME_COLLECTION_NAME, source))?
            .try_collect()
            .await
            .map_err(|source| list_error(GAME_COLLECTION_NAME, source))?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| load_error(GAME_COLLECTION_NAME, id.to_string(), source))?;
        Ok(document.map(Into::into))
    }

    async fn find_game_by_title(&self, title: String) -> MongoResult<Option<GameEntity>> {
        let document = self
            .games()
            .await
            .find_one(doc! {"title": &title})
            .await
            .map_err(|source| load_error(GAME_COLLECTION_NAME, title, source))?;
        Ok(document.map(Into::into))
    }

    async fn insert_game(&self, game: GameEntity) -> MongoResult<()> {
        let title = game.title().to_owned();
        let document: MongoGameDocument = game.into();
        self.games()
            .await
            .insert_one(&document)
            .await
            .map_err(|source| write_error(GAME_COLLECTION_NAME, title, source))?;
        Ok(())
    }

    async fn update_game(
        &self,
        id: Uuid,
        fields: GameFields,
        modified_at: SystemTime,
    ) -> MongoResult<bool> {
        let title = fields.title.clone();
        let update = game_fields_update(fields, DateTime::from_system_time(modified_at));
        let result = self
            .games()
            .await
            .update_one(doc_id(id), update)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::DuplicateKey {
                        collection: GAME_COLLECTION_NAME,
                        value: title,
                    }
                } else {
                    MongoDaoError::Update {
                        collection: GAME_COLLECTION_NAME,
                        id,
                        source,
                    }
                }
            })?;
        Ok(result.matched_count > 0)
    }

    async fn add_owned_platforms(
        &self,
        id: Uuid,
        platforms: Vec<String>,
        modified_at: SystemTime,
    ) -> MongoResult<bool> {
        let update = owned_platforms_update(platforms, DateTime::from_system_time(modified_at));
        let result = self
            .games()
            .await
            .update_one(doc_id(id), update)
            .await
            .map_err(|source| MongoDaoError::Update {
                collection: GAME_COLLECTION_NAME,
                id,
                source,
            })?;
        Ok(result.matched_count > 0)
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .games()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                collection: GAME_COLLECTION_NAME,
                id,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn list_taxonomy(&self, kind: TaxonomyKind) -> MongoResult<Vec<TaxonomyEntity>> {
        let collection = kind.collection_name();
        let documents: Vec<MongoTaxonomyDocument> = self
            .taxonomy(kind)
            .await
            .find(doc! {})
            .sort(doc! {"name": 1})
            .await
            .map_err(|source| list_error(collection, source))?
            .try_collect()
            .await
            .map_err(|source| list_error(collection, source))?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_taxonomy(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
    ) -> MongoResult<Option<TaxonomyEntity>> {
        let document = self
            .taxonomy(kind)
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| load_error(kind.collection_name(), id.to_string(), source))?;
        Ok(document.map(Into::into))
    }

    async fn find_taxonomy_by_name(
        &self,
        kind: TaxonomyKind,
        name: String,
    ) -> MongoResult<Option<TaxonomyEntity>> {
        let document = self
            .taxonomy(kind)
            .await
            .find_one(doc! {"name": &name})
            .await
            .map_err(|source| load_error(kind.collection_name(), name, source))?;
        Ok(document.map(Into::into))
    }

    async fn insert_taxonomy(&self, kind: TaxonomyKind, entry: TaxonomyEntity) -> MongoResult<()> {
        let name = entry.name.clone();
        let document: MongoTaxonomyDocument = entry.into();
        self.taxonomy(kind)
            .await
            .insert_one(&document)
            .await
            .map_err(|source| write_error(kind.collection_name(), name, source))?;
        Ok(())
    }

    async fn update_taxonomy(&self, kind: TaxonomyKind, entry: TaxonomyEntity) -> MongoResult<bool> {
        let collection = kind.collection_name();
        let id = entry.id;
        let name = entry.name.clone();
        let document: MongoTaxonomyDocument = entry.into();
        let result = self
            .taxonomy(kind)
            .await
            .replace_one(doc_id(id), &document)
            .await
            .map_err(|source| {
                if is_duplicate_key(&source) {
                    MongoDaoError::DuplicateKey {
                        collection,
                        value: name,
                    }
                } else {
                    MongoDaoError::Update {
                        collection,
                        id,
                        source,
                    }
                }
            })?;
        Ok(result.matched_count > 0)
    }

    async fn delete_taxonomy(&self, kind: TaxonomyKind, id: Uuid) -> MongoResult<bool> {
        let result = self
            .taxonomy(kind)
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::Delete {
                collection: kind.collection_name(),
                id,
                source,
            })?;
        Ok(result.deleted_count > 0)
    }

    async fn shutdown(&self) {
        let client = {
            let guard = self.inner.state.read().await;
            guard.client.clone()
        };
        client.shutdown().await;
        info!("MongoDB client shut down");
    }
}

fn unique_index(field: &str, name: &str) -> IndexModel {
    let mut keys = Document::new();
    keys.insert(field, 1);
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(Some(name.to_owned()))
                .unique(Some(true))
                .build(),
        )
        .build()
}

fn list_error(collection: &'static str, source: mongodb::error::Error) -> MongoDaoError {
    MongoDaoError::List { collection, source }
}

fn load_error(
    collection: &'static str,
    key: String,
    source: mongodb::error::Error,
) -> MongoDaoError {
    MongoDaoError::Load {
        collection,
        key,
        source,
    }
}

fn write_error(
    collection: &'static str,
    key: String,
    source: mongodb::error::Error,
) -> MongoDaoError {
    if is_duplicate_key(&source) {
        MongoDaoError::DuplicateKey {
            collection,
            value: key,
        }
    } else {
        MongoDaoError::Insert {
            collection,
            key,
            source,
        }
    }
}

impl CatalogStore for MongoCatalogStore {
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games().await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn find_game_by_title(
        &self,
        title: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game_by_title(title).await.map_err(Into::into) })
    }

    fn insert_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_game(game).await.map_err(Into::into) })
    }

    fn update_game(
        &self,
        id: Uuid,
        fields: GameFields,
        modified_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .update_game(id, fields, modified_at)
                .await
                .map_err(Into::into)
        })
    }

    fn add_owned_platforms(
        &self,
        id: Uuid,
        platforms: Vec<String>,
        modified_at: SystemTime,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .add_owned_platforms(id, platforms, modified_at)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn list_taxonomy(
        &self,
        kind: TaxonomyKind,
    ) -> BoxFuture<'static, StorageResult<Vec<TaxonomyEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_taxonomy(kind).await.map_err(Into::into) })
    }

    fn find_taxonomy(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<TaxonomyEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_taxonomy(kind, id).await.map_err(Into::into) })
    }

    fn find_taxonomy_by_name(
        &self,
        kind: TaxonomyKind,
        name: String,
    ) -> BoxFuture<'static, StorageResult<Option<TaxonomyEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_taxonomy_by_name(kind, name)
                .await
                .map_err(Into::into)
        })
    }

    fn insert_taxonomy(
        &self,
        kind: TaxonomyKind,
        entry: TaxonomyEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.insert_taxonomy(kind, entry).await.map_err(Into::into) })
    }

    fn update_taxonomy(
        &self,
        kind: TaxonomyKind,
        entry: TaxonomyEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.update_taxonomy(kind, entry).await.map_err(Into::into) })
    }

    fn delete_taxonomy(
        &self,
        kind: TaxonomyKind,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_taxonomy(kind, id).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }

    fn close(&self) -> BoxFuture<'static, ()> {
        let store = self.clone();
        Box::pin(async move { store.shutdown().await })
    }
}
