use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};
use thiserror::Error;
use uuid::Uuid;

pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Server error code reported when a write violates a unique index.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Failures of the MongoDB store before they are folded into `StorageError`.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        attempts: u32,
        #[source]
        source: MongoError,
    },
    #[error("MongoDB ping health check failed")]
    HealthPing {
        #[source]
        source: MongoError,
    },
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("`{value}` violates a unique index on `{collection}`")]
    DuplicateKey {
        collection: &'static str,
        value: String,
    },
    #[error("failed to list documents of `{collection}`")]
    List {
        collection: &'static str,
        #[source]
        source: MongoError,
    },
    #[error("failed to load `{key}` from `{collection}`")]
    Load {
        collection: &'static str,
        key: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to insert `{key}` into `{collection}`")]
    Insert {
        collection: &'static str,
        key: String,
        #[source]
        source: MongoError,
    },
    #[error("failed to update `{id}` in `{collection}`")]
    Update {
        collection: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
    #[error("failed to delete `{id}` from `{collection}`")]
    Delete {
        collection: &'static str,
        id: Uuid,
        #[source]
        source: MongoError,
    },
}

/// Whether a write failed because of a unique index.
pub fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}
