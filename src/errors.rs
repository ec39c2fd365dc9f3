use serde::Serialize;
use thiserror::Error;

use crate::db::Collection;

/// Failures reported by an external collaborator (document store or account
/// provider). These are surfaced unchanged; nothing in this crate retries them.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Document {id} does not exist in {collection}")]
    MissingDocument { collection: Collection, id: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Auth(String),
}

impl CollaboratorError {
    pub fn is_missing_document(&self) -> bool {
        matches!(self, Self::MissingDocument { .. })
    }
}

#[derive(Debug, Error, Serialize)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Collaborator error: {0}")]
    Collaborator(
        #[from]
        #[serde(skip)]
        CollaboratorError,
    ),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Collaborator(CollaboratorError::Serialization(err))
    }
}

impl ServiceError {
    /// Stable machine-readable code, used for metric labels and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::InvalidState(_) => "invalid_state",
            Self::ValidationError(_) => "validation_error",
            Self::Collaborator(_) => "collaborator_error",
        }
    }

    /// True for errors detected before any collaborator call was made.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Collaborator(_))
    }
}
