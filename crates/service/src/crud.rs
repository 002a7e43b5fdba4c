use async_trait::async_trait;
use uuid::Uuid;

/// Capability set every entity service provides.
///
/// Lets callers drive any entity service generically; each implementation
/// keeps its own typed failure taxonomy through the associated `Error`.
#[async_trait]
pub trait EntityService<E>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn insert(&self, entity: Option<E>) -> Result<E, Self::Error>;
    async fn modify(&self, entity: Option<E>) -> Result<E, Self::Error>;
    async fn retrieve_by_id(&self, id: Uuid) -> Result<E, Self::Error>;
    async fn retrieve_all(&self) -> Result<Vec<E>, Self::Error>;
    async fn remove_by_id(&self, id: Uuid) -> Result<E, Self::Error>;
}
