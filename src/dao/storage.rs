use std::error::Error;
use thiserror::Error;

type BoxError = Box<dyn Error + Send + Sync>;

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend-agnostic failure of a [`CatalogStore`](crate::dao::catalog_store::CatalogStore) call.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not serve the request (connection lost, timeout, driver error).
    #[error("catalog store unavailable: {context}")]
    Unavailable {
        context: String,
        #[source]
        source: BoxError,
    },
    /// A write collided with a unique key: game title, platform name or genre name.
    #[error("duplicate key: {message}")]
    Conflict { message: String },
}

impl StorageError {
    /// Backend failure while doing `context`, e.g. "inserting game".
    pub fn unavailable(
        context: impl Into<String>,
        source: impl Error + Send + Sync + 'static,
    ) -> Self {
        Self::Unavailable {
            context: context.into(),
            source: Box::new(source),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// True for uniqueness violations, which map to `409 Conflict`.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
