mod config;
mod connection;
mod error;
mod models;
mod store;

pub use config::MongoConfig;
pub use error::{MongoDaoError, MongoResult};
pub use store::MongoCatalogStore;

use crate::dao::storage::StorageError;

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        match err {
            MongoDaoError::DuplicateKey { collection, value } => {
                StorageError::conflict(format!("`{value}` already exists in `{collection}`"))
            }
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
