use std::sync::Arc;

use async_trait::async_trait;
use models::attachment::Attachment;
use uuid::Uuid;

use crate::brokers::clock::Clock;
use crate::brokers::logging::FailureLog;
use crate::brokers::storage::{EntityStore, StorageError};
use crate::crud::EntityService;
use crate::validation::{self, Fault, ValidationPolicy};

use super::errors::{AttachmentError, AttachmentValidation};

/// Attachment business service independent of transport and persistence.
pub struct AttachmentService<S, C, L> {
    store: Arc<S>,
    clock: Arc<C>,
    log: Arc<L>,
    policy: ValidationPolicy,
}

impl<S, C, L> AttachmentService<S, C, L>
where
    S: EntityStore<Attachment>,
    C: Clock,
    L: FailureLog,
{
    pub fn new(store: Arc<S>, clock: Arc<C>, log: Arc<L>, policy: ValidationPolicy) -> Self {
        Self { store, clock, log, policy }
    }

    /// Validate and persist a new attachment record.
    pub async fn insert(&self, attachment: Option<Attachment>) -> Result<Attachment, AttachmentError> {
        let attachment = self.ensure_present(attachment)?;
        self.ensure_valid(&attachment)?;
        self.store
            .insert(attachment)
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    /// Re-validate an existing attachment against its stored snapshot, then
    /// persist the change.
    pub async fn modify(&self, attachment: Option<Attachment>) -> Result<Attachment, AttachmentError> {
        let attachment = self.ensure_present(attachment)?;
        self.ensure_valid(&attachment)?;
        self.ensure_dates_differ(&attachment)?;
        self.ensure_recent(&attachment)?;
        let stored = self.lookup(attachment.id).await?;
        self.ensure_matches_stored(&attachment, &stored)?;
        self.store
            .update(attachment)
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    pub async fn retrieve_by_id(&self, id: Uuid) -> Result<Attachment, AttachmentError> {
        self.ensure_id(id)?;
        self.lookup(id).await
    }

    pub async fn retrieve_all(&self) -> Result<Vec<Attachment>, AttachmentError> {
        self.store
            .select_all()
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    /// Look up and delete an attachment, returning the removed record.
    pub async fn remove_by_id(&self, id: Uuid) -> Result<Attachment, AttachmentError> {
        self.ensure_id(id)?;
        let stored = self.lookup(id).await?;
        self.store
            .delete(stored)
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    // --- validation -------------------------------------------------------

    fn ensure_present(&self, attachment: Option<Attachment>) -> Result<Attachment, AttachmentError> {
        attachment.ok_or_else(|| self.validation_failure(AttachmentValidation::Missing))
    }

    fn ensure_id(&self, id: Uuid) -> Result<(), AttachmentError> {
        if validation::id_missing(id) {
            return Err(self.fault(Fault::required_id("id")));
        }
        Ok(())
    }

    /// Structural validation; stops at the first violated rule.
    fn ensure_valid(&self, attachment: &Attachment) -> Result<(), AttachmentError> {
        if validation::id_missing(attachment.id) {
            return Err(self.fault(Fault::required_id("id")));
        }
        if validation::text_missing(&attachment.label) {
            return Err(self.fault(Fault::required_text("label")));
        }
        if validation::text_missing(&attachment.description) {
            return Err(self.fault(Fault::required_text("description")));
        }
        if validation::text_missing(&attachment.content_type) {
            return Err(self.fault(Fault::required_text("content_type")));
        }
        if validation::text_missing(&attachment.extension) {
            return Err(self.fault(Fault::required_text("extension")));
        }
        if let Some(fault) = validation::audit_faults(attachment).into_iter().next() {
            return Err(self.fault(fault));
        }
        Ok(())
    }

    fn ensure_dates_differ(&self, attachment: &Attachment) -> Result<(), AttachmentError> {
        if attachment.updated_date == attachment.created_date {
            return Err(self.fault(Fault::same_as("updated_date", "created_date")));
        }
        Ok(())
    }

    fn ensure_recent(&self, attachment: &Attachment) -> Result<(), AttachmentError> {
        let now = self.clock.now();
        if !self.policy.is_recent(now, attachment.updated_date) {
            return Err(self.fault(Fault::not_recent("updated_date")));
        }
        Ok(())
    }

    fn ensure_matches_stored(
        &self,
        attachment: &Attachment,
        stored: &Attachment,
    ) -> Result<(), AttachmentError> {
        if attachment.created_date != stored.created_date {
            return Err(self.fault(Fault::stored_mismatch("created_date")));
        }
        if attachment.created_by != stored.created_by {
            return Err(self.fault(Fault::stored_mismatch("created_by")));
        }
        if attachment.updated_date == stored.updated_date {
            return Err(self.fault(Fault::same_as("updated_date", "the stored updated_date")));
        }
        Ok(())
    }

    async fn lookup(&self, id: Uuid) -> Result<Attachment, AttachmentError> {
        match self.store.select_by_id(id).await {
            Ok(Some(attachment)) => Ok(attachment),
            Ok(None) => Err(self.validation_failure(AttachmentValidation::NotFound(id))),
            Err(failure) => Err(self.storage_failure(failure)),
        }
    }

    // --- failure normalization -------------------------------------------

    fn fault(&self, fault: Fault) -> AttachmentError {
        self.validation_failure(AttachmentValidation::Invalid(fault))
    }

    fn validation_failure(&self, validation: AttachmentValidation) -> AttachmentError {
        let failure = AttachmentError::Validation(validation);
        self.log.error(&failure);
        failure
    }

    fn storage_failure(&self, failure: StorageError) -> AttachmentError {
        match failure {
            StorageError::Connectivity(_) => {
                let wrapped = AttachmentError::Dependency(failure);
                self.log.critical(&wrapped);
                wrapped
            }
            StorageError::Conflict(_) | StorageError::Stale(_) => {
                let wrapped = AttachmentError::Dependency(failure);
                self.log.error(&wrapped);
                wrapped
            }
            StorageError::Other(_) => {
                let wrapped = AttachmentError::Service(failure);
                self.log.error(&wrapped);
                wrapped
            }
        }
    }
}

#[async_trait]
impl<S, C, L> EntityService<Attachment> for AttachmentService<S, C, L>
where
    S: EntityStore<Attachment>,
    C: Clock,
    L: FailureLog,
{
    type Error = AttachmentError;

    async fn insert(&self, entity: Option<Attachment>) -> Result<Attachment, AttachmentError> {
        AttachmentService::insert(self, entity).await
    }

    async fn modify(&self, entity: Option<Attachment>) -> Result<Attachment, AttachmentError> {
        AttachmentService::modify(self, entity).await
    }

    async fn retrieve_by_id(&self, id: Uuid) -> Result<Attachment, AttachmentError> {
        AttachmentService::retrieve_by_id(self, id).await
    }

    async fn retrieve_all(&self) -> Result<Vec<Attachment>, AttachmentError> {
        AttachmentService::retrieve_all(self).await
    }

    async fn remove_by_id(&self, id: Uuid) -> Result<Attachment, AttachmentError> {
        AttachmentService::remove_by_id(self, id).await
    }
}
