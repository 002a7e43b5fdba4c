use thiserror::Error;
use uuid::Uuid;

use crate::brokers::storage::StorageError;
use crate::validation::Fault;

/// Failure taxonomy surfaced by the attachment service.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("attachment validation failed: {0}")]
    Validation(#[from] AttachmentValidation),
    #[error("attachment dependency failure: {0}")]
    Dependency(#[source] StorageError),
    #[error("attachment service failure: {0}")]
    Service(#[source] StorageError),
}

impl AttachmentError {
    pub fn validation(&self) -> Option<&AttachmentValidation> {
        match self {
            Self::Validation(validation) => Some(validation),
            _ => None,
        }
    }
}

/// Invariant violations raised before storage is written.
///
/// `Invalid` carries only the first violated rule; attachment validation
/// stops at the first fault.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AttachmentValidation {
    #[error("no attachment was supplied")]
    Missing,
    #[error("attachment with id {0} was not found")]
    NotFound(Uuid),
    #[error("invalid attachment: {0}")]
    Invalid(Fault),
}

impl AttachmentValidation {
    /// Whether this failure cites the given field.
    pub fn cites(&self, field: &str) -> bool {
        matches!(self, Self::Invalid(fault) if fault.field == field)
    }
}
