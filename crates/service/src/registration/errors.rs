use thiserror::Error;
use uuid::Uuid;

use crate::brokers::storage::StorageError;
use crate::validation::Fault;

/// Failure taxonomy surfaced by the student-registration service.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("student registration validation failed: {0}")]
    Validation(#[from] RegistrationValidation),
    #[error("student registration dependency failure: {0}")]
    Dependency(#[source] StorageError),
    #[error("student registration service failure: {0}")]
    Service(#[source] StorageError),
}

impl RegistrationError {
    pub fn validation(&self) -> Option<&RegistrationValidation> {
        match self {
            Self::Validation(validation) => Some(validation),
            _ => None,
        }
    }
}

/// Invariant violations raised before storage is written.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RegistrationValidation {
    #[error("no student registration was supplied")]
    Missing,
    #[error("student registration with id {0} was not found")]
    NotFound(Uuid),
    #[error("invalid student registration: {0}")]
    Invalid(Fault),
}

impl RegistrationValidation {
    /// Whether this failure cites the given field.
    pub fn cites(&self, field: &str) -> bool {
        matches!(self, Self::Invalid(fault) if fault.field == field)
    }
}
