use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use models::entity::Audited;
use uuid::Uuid;

use crate::brokers::storage::{EntityStore, StorageError};

/// In-memory storage broker keyed by entity id.
///
/// The default store when no database broker is wired in; also backs tests
/// and doc examples.
pub struct InMemoryStore<E> {
    rows: RwLock<HashMap<Uuid, E>>,
}

impl<E> InMemoryStore<E> {
    pub fn new() -> Self {
        Self { rows: RwLock::new(HashMap::new()) }
    }
}

impl<E> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E> EntityStore<E> for InMemoryStore<E>
where
    E: Audited + Clone + Send + Sync + 'static,
{
    async fn insert(&self, entity: E) -> Result<E, StorageError> {
        let mut rows = self.rows.write().unwrap();
        if rows.contains_key(&entity.entity_id()) {
            return Err(StorageError::Conflict(format!(
                "duplicate id {}",
                entity.entity_id()
            )));
        }
        rows.insert(entity.entity_id(), entity.clone());
        Ok(entity)
    }

    async fn select_by_id(&self, id: Uuid) -> Result<Option<E>, StorageError> {
        let rows = self.rows.read().unwrap();
        Ok(rows.get(&id).cloned())
    }

    async fn select_all(&self) -> Result<Vec<E>, StorageError> {
        let rows = self.rows.read().unwrap();
        let mut all: Vec<E> = rows.values().cloned().collect();
        // Stable ordering for callers that list repeatedly
        all.sort_by_key(|e| (e.created_date(), e.entity_id()));
        Ok(all)
    }

    async fn update(&self, entity: E) -> Result<E, StorageError> {
        let mut rows = self.rows.write().unwrap();
        match rows.get_mut(&entity.entity_id()) {
            Some(slot) => {
                *slot = entity.clone();
                Ok(entity)
            }
            None => Err(StorageError::Stale(format!(
                "no row with id {}",
                entity.entity_id()
            ))),
        }
    }

    async fn delete(&self, entity: E) -> Result<E, StorageError> {
        let mut rows = self.rows.write().unwrap();
        match rows.remove(&entity.entity_id()) {
            Some(_) => Ok(entity),
            None => Err(StorageError::Stale(format!(
                "no row with id {}",
                entity.entity_id()
            ))),
        }
    }
}
