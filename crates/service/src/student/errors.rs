use thiserror::Error;
use uuid::Uuid;

use crate::brokers::storage::StorageError;
use crate::validation::{describe, Fault};

/// Failure taxonomy surfaced by the student service.
#[derive(Debug, Error)]
pub enum StudentError {
    #[error("student validation failed: {0}")]
    Validation(#[from] StudentValidation),
    #[error("student dependency failure: {0}")]
    Dependency(#[source] StorageError),
    #[error("student service failure: {0}")]
    Service(#[source] StorageError),
}

impl StudentError {
    pub fn validation(&self) -> Option<&StudentValidation> {
        match self {
            Self::Validation(validation) => Some(validation),
            _ => None,
        }
    }
}

/// Invariant violations raised before storage is written.
///
/// `Invalid` aggregates every violated field rule found in one pass.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StudentValidation {
    #[error("no student was supplied")]
    Missing,
    #[error("student with id {0} was not found")]
    NotFound(Uuid),
    #[error("invalid student: {}", describe(.0))]
    Invalid(Vec<Fault>),
}

impl StudentValidation {
    /// Whether this failure cites the given field.
    pub fn cites(&self, field: &str) -> bool {
        matches!(self, Self::Invalid(faults) if faults.iter().any(|f| f.field == field))
    }
}
