#![cfg(test)]
//! Shared fixtures: sample entities and a call-counting store wrapper.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use models::attachment::Attachment;
use models::entity::Audited;
use models::student::{Gender, Student};
use models::student_registration::StudentRegistration;
use uuid::Uuid;

use crate::brokers::memory::InMemoryStore;
use crate::brokers::storage::{EntityStore, StorageError};

/// A valid student whose audit dates sit 10 minutes in the past, as a
/// freshly-inserted record would.
pub fn sample_student(now: DateTime<Utc>) -> Student {
    let then = now - Duration::minutes(10);
    Student {
        id: Uuid::new_v4(),
        user_id: "user-001".to_string(),
        identity_number: "SID-0001".to_string(),
        first_name: "Ada".to_string(),
        middle_name: None,
        last_name: "Lovelace".to_string(),
        gender: Gender::Female,
        birth_date: now - Duration::days(8000),
        created_by: Uuid::new_v4(),
        created_date: then,
        updated_by: Uuid::new_v4(),
        updated_date: then,
    }
}

pub fn sample_attachment(now: DateTime<Utc>) -> Attachment {
    let then = now - Duration::minutes(10);
    Attachment {
        id: Uuid::new_v4(),
        label: "transcript".to_string(),
        description: "End of term transcript".to_string(),
        content_type: "application/pdf".to_string(),
        extension: "pdf".to_string(),
        created_by: Uuid::new_v4(),
        created_date: then,
        updated_by: Uuid::new_v4(),
        updated_date: then,
    }
}

pub fn sample_registration(now: DateTime<Utc>) -> StudentRegistration {
    let then = now - Duration::minutes(10);
    StudentRegistration {
        id: Uuid::new_v4(),
        student_id: Uuid::new_v4(),
        registration_id: Uuid::new_v4(),
        notes: None,
        created_by: Uuid::new_v4(),
        created_date: then,
        updated_by: Uuid::new_v4(),
        updated_date: then,
    }
}

/// Failure classes a test can inject into the next store call.
#[derive(Clone, Copy, Debug)]
pub enum InjectedFailure {
    Connectivity,
    Conflict,
    Stale,
    Other,
}

impl InjectedFailure {
    fn into_error(self) -> StorageError {
        match self {
            InjectedFailure::Connectivity => {
                StorageError::Connectivity("connection refused".to_string())
            }
            InjectedFailure::Conflict => StorageError::Conflict("duplicate key".to_string()),
            InjectedFailure::Stale => StorageError::Stale("row version changed".to_string()),
            InjectedFailure::Other => StorageError::Other("disk on fire".to_string()),
        }
    }
}

/// In-memory store that counts calls per operation and can fail on demand,
/// so tests can assert exactly which broker calls a service made.
pub struct TrackingStore<E> {
    inner: InMemoryStore<E>,
    fail_next: Mutex<Option<InjectedFailure>>,
    pub inserts: AtomicUsize,
    pub selects_by_id: AtomicUsize,
    pub selects_all: AtomicUsize,
    pub updates: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl<E> TrackingStore<E> {
    pub fn new() -> Self {
        Self {
            inner: InMemoryStore::new(),
            fail_next: Mutex::new(None),
            inserts: AtomicUsize::new(0),
            selects_by_id: AtomicUsize::new(0),
            selects_all: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn fail_next(&self, failure: InjectedFailure) {
        *self.fail_next.lock().unwrap() = Some(failure);
    }

    pub fn total_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
            + self.selects_by_id.load(Ordering::SeqCst)
            + self.selects_all.load(Ordering::SeqCst)
            + self.updates.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
    }

    fn take_failure(&self) -> Option<StorageError> {
        self.fail_next.lock().unwrap().take().map(InjectedFailure::into_error)
    }
}

impl<E> TrackingStore<E>
where
    E: Audited + Clone + Send + Sync + 'static,
{
    /// Seed a row without counting the call against the test's assertions.
    pub async fn preload(&self, entity: E) {
        self.inner.insert(entity).await.expect("preload entity");
    }
}

#[async_trait]
impl<E> EntityStore<E> for TrackingStore<E>
where
    E: Audited + Clone + Send + Sync + 'static,
{
    async fn insert(&self, entity: E) -> Result<E, StorageError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.take_failure() {
            return Err(failure);
        }
        self.inner.insert(entity).await
    }

    async fn select_by_id(&self, id: Uuid) -> Result<Option<E>, StorageError> {
        self.selects_by_id.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.take_failure() {
            return Err(failure);
        }
        self.inner.select_by_id(id).await
    }

    async fn select_all(&self) -> Result<Vec<E>, StorageError> {
        self.selects_all.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.take_failure() {
            return Err(failure);
        }
        self.inner.select_all().await
    }

    async fn update(&self, entity: E) -> Result<E, StorageError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.take_failure() {
            return Err(failure);
        }
        self.inner.update(entity).await
    }

    async fn delete(&self, entity: E) -> Result<E, StorageError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if let Some(failure) = self.take_failure() {
            return Err(failure);
        }
        self.inner.delete(entity).await
    }
}
