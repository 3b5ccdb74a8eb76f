//! CRUD orchestration.
//!
//! Each entity operation composes a remote mutation, an optimistic update of
//! the local snapshot, and (for serve attempts) a best-effort email
//! notification. Functions are generic over [`crate::backend::RemoteBackend`]
//! so tests can inject a mock.

use thiserror::Error;

use crate::backend::BackendError;
use crate::domain::types::TypeConstraintError;

pub mod case;
pub mod client;
pub mod document;
pub mod serve;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found")]
    NotFound,

    #[error("Form validation error: {0}")]
    Form(String),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<TypeConstraintError> for ServiceError {
    fn from(err: TypeConstraintError) -> Self {
        ServiceError::Form(err.to_string())
    }
}
