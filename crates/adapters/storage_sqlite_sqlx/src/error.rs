//! Storage-specific error type wrapping sqlx errors.

use infratree_domain::error::InfraTreeError;

/// Errors originating from the `SQLite` storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A query or connection failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored body is not a JSON document.
    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to run migrations.
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<StorageError> for InfraTreeError {
    fn from(err: StorageError) -> Self {
        Self::Storage(Box::new(err))
    }
}
