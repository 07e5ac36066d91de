//! Injected collaborators standing in for hosted services.
//!
//! # Responsibility
//! - Declare the narrow contracts core needs from auth, file storage and
//!   push notification platforms.
//! - Keep services free of any direct platform or network access.
//!
//! # Invariants
//! - Capability failures surface as [`CapabilityError`], never panics.
//! - Implementations own their transport; core only sees request/response.

mod auth;

pub use auth::StaticAuthProvider;

use crate::model::UserId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// External collaborator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Auth,
    FileStore,
    Notifier,
}

impl Capability {
    /// Stable id used in log events and error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::FileStore => "file_store",
            Self::Notifier => "notifier",
        }
    }
}

/// Failure reported by an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityError {
    pub capability: Capability,
    pub message: String,
}

impl CapabilityError {
    pub fn new(capability: Capability, message: impl Into<String>) -> Self {
        Self {
            capability,
            message: message.into(),
        }
    }
}

impl Display for CapabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.capability.as_str(), self.message)
    }
}

impl Error for CapabilityError {}

/// Current-user lookup.
pub trait AuthProvider {
    /// Returns the signed-in user, or `None` when nobody is signed in.
    fn current_user(&self) -> Result<Option<UserId>, CapabilityError>;
}

impl<T: AuthProvider + ?Sized> AuthProvider for &T {
    fn current_user(&self) -> Result<Option<UserId>, CapabilityError> {
        (**self).current_user()
    }
}

/// Blob storage for journal photos.
pub trait FileStore {
    /// Stores `bytes` under `path` and returns a publicly readable URL.
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, CapabilityError>;
    /// Removes a previously uploaded blob.
    fn remove(&self, path: &str) -> Result<(), CapabilityError>;
}

impl<T: FileStore + ?Sized> FileStore for &T {
    fn upload(&self, path: &str, bytes: &[u8]) -> Result<String, CapabilityError> {
        (**self).upload(path, bytes)
    }

    fn remove(&self, path: &str) -> Result<(), CapabilityError> {
        (**self).remove(path)
    }
}

/// Platform permission state for notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    /// User has not decided yet.
    Default,
    Granted,
    Denied,
}

impl NotificationPermission {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Granted => "granted",
            Self::Denied => "denied",
        }
    }
}

/// Device registration returned by the push platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEndpoint {
    pub endpoint: String,
    /// Platform subscription document (keys, expiration) as JSON.
    pub payload: serde_json::Value,
}

/// Push-notification registration.
pub trait Notifier {
    fn request_permission(&self) -> Result<NotificationPermission, CapabilityError>;
    fn subscribe(&self) -> Result<PushEndpoint, CapabilityError>;
    fn unsubscribe(&self) -> Result<(), CapabilityError>;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn request_permission(&self) -> Result<NotificationPermission, CapabilityError> {
        (**self).request_permission()
    }

    fn subscribe(&self) -> Result<PushEndpoint, CapabilityError> {
        (**self).subscribe()
    }

    fn unsubscribe(&self) -> Result<(), CapabilityError> {
        (**self).unsubscribe()
    }
}
