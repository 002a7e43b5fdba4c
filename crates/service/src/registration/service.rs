use std::sync::Arc;

use async_trait::async_trait;
use models::student_registration::StudentRegistration;
use uuid::Uuid;

use crate::brokers::clock::Clock;
use crate::brokers::logging::FailureLog;
use crate::brokers::storage::{EntityStore, StorageError};
use crate::crud::EntityService;
use crate::validation::{self, Fault, ValidationPolicy};

use super::errors::{RegistrationError, RegistrationValidation};

/// Student-registration business service independent of transport and
/// persistence.
pub struct StudentRegistrationService<S, C, L> {
    store: Arc<S>,
    clock: Arc<C>,
    log: Arc<L>,
    policy: ValidationPolicy,
}

impl<S, C, L> StudentRegistrationService<S, C, L>
where
    S: EntityStore<StudentRegistration>,
    C: Clock,
    L: FailureLog,
{
    pub fn new(store: Arc<S>, clock: Arc<C>, log: Arc<L>, policy: ValidationPolicy) -> Self {
        Self { store, clock, log, policy }
    }

    /// Validate and persist a new registration link.
    pub async fn insert(
        &self,
        registration: Option<StudentRegistration>,
    ) -> Result<StudentRegistration, RegistrationError> {
        let registration = self.ensure_present(registration)?;
        self.ensure_valid(&registration)?;
        self.store
            .insert(registration)
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    /// Re-validate an existing registration against its stored snapshot,
    /// then persist the change.
    pub async fn modify(
        &self,
        registration: Option<StudentRegistration>,
    ) -> Result<StudentRegistration, RegistrationError> {
        let registration = self.ensure_present(registration)?;
        self.ensure_valid(&registration)?;
        self.ensure_dates_differ(&registration)?;
        self.ensure_recent(&registration)?;
        let stored = self.lookup(registration.id).await?;
        self.ensure_matches_stored(&registration, &stored)?;
        self.store
            .update(registration)
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    pub async fn retrieve_by_id(
        &self,
        id: Uuid,
    ) -> Result<StudentRegistration, RegistrationError> {
        self.ensure_id(id)?;
        self.lookup(id).await
    }

    pub async fn retrieve_all(&self) -> Result<Vec<StudentRegistration>, RegistrationError> {
        self.store
            .select_all()
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    /// Look up and delete a registration, returning the removed record.
    pub async fn remove_by_id(
        &self,
        id: Uuid,
    ) -> Result<StudentRegistration, RegistrationError> {
        self.ensure_id(id)?;
        let stored = self.lookup(id).await?;
        self.store
            .delete(stored)
            .await
            .map_err(|failure| self.storage_failure(failure))
    }

    // --- validation -------------------------------------------------------

    fn ensure_present(
        &self,
        registration: Option<StudentRegistration>,
    ) -> Result<StudentRegistration, RegistrationError> {
        registration.ok_or_else(|| self.validation_failure(RegistrationValidation::Missing))
    }

    fn ensure_id(&self, id: Uuid) -> Result<(), RegistrationError> {
        if validation::id_missing(id) {
            return Err(self.fault(Fault::required_id("id")));
        }
        Ok(())
    }

    /// Structural validation; stops at the first violated rule.
    fn ensure_valid(&self, registration: &StudentRegistration) -> Result<(), RegistrationError> {
        if validation::id_missing(registration.id) {
            return Err(self.fault(Fault::required_id("id")));
        }
        if validation::id_missing(registration.student_id) {
            return Err(self.fault(Fault::required_id("student_id")));
        }
        if validation::id_missing(registration.registration_id) {
            return Err(self.fault(Fault::required_id("registration_id")));
        }
        if let Some(fault) = validation::audit_faults(registration).into_iter().next() {
            return Err(self.fault(fault));
        }
        Ok(())
    }

    fn ensure_dates_differ(
        &self,
        registration: &StudentRegistration,
    ) -> Result<(), RegistrationError> {
        if registration.updated_date == registration.created_date {
            return Err(self.fault(Fault::same_as("updated_date", "created_date")));
        }
        Ok(())
    }

    fn ensure_recent(&self, registration: &StudentRegistration) -> Result<(), RegistrationError> {
        let now = self.clock.now();
        if !self.policy.is_recent(now, registration.updated_date) {
            return Err(self.fault(Fault::not_recent("updated_date")));
        }
        Ok(())
    }

    fn ensure_matches_stored(
        &self,
        registration: &StudentRegistration,
        stored: &StudentRegistration,
    ) -> Result<(), RegistrationError> {
        if registration.created_date != stored.created_date {
            return Err(self.fault(Fault::stored_mismatch("created_date")));
        }
        if registration.created_by != stored.created_by {
            return Err(self.fault(Fault::stored_mismatch("created_by")));
        }
        if registration.updated_date == stored.updated_date {
            return Err(self.fault(Fault::same_as("updated_date", "the stored updated_date")));
        }
        Ok(())
    }

    async fn lookup(&self, id: Uuid) -> Result<StudentRegistration, RegistrationError> {
        match self.store.select_by_id(id).await {
            Ok(Some(registration)) => Ok(registration),
            Ok(None) => Err(self.validation_failure(RegistrationValidation::NotFound(id))),
            Err(failure) => Err(self.storage_failure(failure)),
        }
    }

    // --- failure normalization -------------------------------------------

    fn fault(&self, fault: Fault) -> RegistrationError {
        self.validation_failure(RegistrationValidation::Invalid(fault))
    }

    fn validation_failure(&self, validation: RegistrationValidation) -> RegistrationError {
        let failure = RegistrationError::Validation(validation);
        self.log.error(&failure);
        failure
    }

    fn storage_failure(&self, failure: StorageError) -> RegistrationError {
        match failure {
            StorageError::Connectivity(_) => {
                let wrapped = RegistrationError::Dependency(failure);
                self.log.critical(&wrapped);
                wrapped
            }
            StorageError::Conflict(_) | StorageError::Stale(_) => {
                let wrapped = RegistrationError::Dependency(failure);
                self.log.error(&wrapped);
                wrapped
            }
            StorageError::Other(_) => {
                let wrapped = RegistrationError::Service(failure);
                self.log.error(&wrapped);
                wrapped
            }
        }
    }
}

#[async_trait]
impl<S, C, L> EntityService<StudentRegistration> for StudentRegistrationService<S, C, L>
where
    S: EntityStore<StudentRegistration>,
    C: Clock,
    L: FailureLog,
{
    type Error = RegistrationError;

    async fn insert(
        &self,
        entity: Option<StudentRegistration>,
    ) -> Result<StudentRegistration, RegistrationError> {
        StudentRegistrationService::insert(self, entity).await
    }

    async fn modify(
        &self,
        entity: Option<StudentRegistration>,
    ) -> Result<StudentRegistration, RegistrationError> {
        StudentRegistrationService::modify(self, entity).await
    }

    async fn retrieve_by_id(&self, id: Uuid) -> Result<StudentRegistration, RegistrationError> {
        StudentRegistrationService::retrieve_by_id(self, id).await
    }

    async fn retrieve_all(&self) -> Result<Vec<StudentRegistration>, RegistrationError> {
        StudentRegistrationService::retrieve_all(self).await
    }

    async fn remove_by_id(&self, id: Uuid) -> Result<StudentRegistration, RegistrationError> {
        StudentRegistrationService::remove_by_id(self, id).await
    }
}
