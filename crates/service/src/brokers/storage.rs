use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by a storage broker.
///
/// Services map these onto their own taxonomies: `Connectivity` becomes a
/// critical dependency failure, `Conflict` and `Stale` non-critical
/// dependency failures, `Other` an unexpected service failure.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage connectivity failure: {0}")]
    Connectivity(String),

    #[error("storage conflict: {0}")]
    Conflict(String),

    #[error("stale record: {0}")]
    Stale(String),

    #[error("storage failure: {0}")]
    Other(String),
}

/// Storage broker abstraction for a single entity type.
#[async_trait]
pub trait EntityStore<E>: Send + Sync {
    async fn insert(&self, entity: E) -> Result<E, StorageError>;
    async fn select_by_id(&self, id: Uuid) -> Result<Option<E>, StorageError>;
    async fn select_all(&self) -> Result<Vec<E>, StorageError>;
    async fn update(&self, entity: E) -> Result<E, StorageError>;
    async fn delete(&self, entity: E) -> Result<E, StorageError>;
}
