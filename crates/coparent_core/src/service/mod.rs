//! Core use-case services.
//!
//! # Responsibility
//! - Resolve the acting user through the injected [`AuthProvider`].
//! - Orchestrate validation, expansion and repository calls into use-case
//!   level APIs.
//! - Emit metadata-only log events for every mutation.
//!
//! # Invariants
//! - Services never bypass repository validation/persistence contracts.
//! - Rows owned by another user are reported as not found.

pub mod calendar_service;
pub mod child_service;
pub mod connection_service;
pub mod favor_service;
pub mod message_service;
pub mod payment_service;

use crate::capability::{AuthProvider, CapabilityError};
use crate::model::{UserId, ValidationError};
use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error returned by every use-case service.
#[derive(Debug)]
pub enum ServiceError {
    /// No user is signed in.
    NotAuthenticated,
    Validation(ValidationError),
    /// Target does not exist or is not visible to the acting user.
    NotFound(Uuid),
    /// Target is visible but the acting user may not change it.
    Forbidden(Uuid),
    Conflict(String),
    Capability(CapabilityError),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "you must be signed in"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "not found: {id}"),
            Self::Forbidden(id) => write!(f, "not allowed to modify {id}"),
            Self::Conflict(message) => write!(f, "{message}"),
            Self::Capability(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Capability(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::Conflict(message) => Self::Conflict(message),
            other => Self::Repo(other),
        }
    }
}

impl From<ValidationError> for ServiceError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<CapabilityError> for ServiceError {
    fn from(value: CapabilityError) -> Self {
        Self::Capability(value)
    }
}

/// Resolves the acting user or fails with [`ServiceError::NotAuthenticated`].
pub(crate) fn require_user(auth: &impl AuthProvider) -> ServiceResult<UserId> {
    auth.current_user()?.ok_or(ServiceError::NotAuthenticated)
}
