//! Profiles and parent-to-parent connections.
//!
//! # Invariants
//! - Profile email is stored lowercase and is unique across users.
//! - A connection never links a user to themself.

use crate::model::{check_id, optional_text, UserId, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ConnectionId = Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Public profile shown to connected parents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
}

impl Profile {
    /// Normalizes text fields in place and validates the result.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let email = match optional_text("email", self.email.as_deref(), 254)? {
            Some(value) => Some(normalize_email(&value)?),
            None => None,
        };
        let profile = Self {
            user_id: self.user_id,
            full_name: optional_text("full_name", self.full_name.as_deref(), 100)?,
            email,
            phone: optional_text("phone", self.phone.as_deref(), 32)?,
            avatar_url: optional_text("avatar_url", self.avatar_url.as_deref(), 2048)?,
        };
        check_id("user_id", profile.user_id)?;
        Ok(profile)
    }
}

/// Lowercases and trims an email address, rejecting obviously malformed input.
pub fn normalize_email(value: &str) -> Result<String, ValidationError> {
    let normalized = value.trim().to_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(ValidationError::InvalidEmail(value.trim().to_string()));
    }
    Ok(normalized)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ConnectionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub requester: UserId,
    pub addressee: UserId,
    pub status: ConnectionStatus,
}

impl Connection {
    /// Opens a pending request from `requester` to `addressee`.
    pub fn request(requester: UserId, addressee: UserId) -> Result<Self, ValidationError> {
        let connection = Self {
            id: Uuid::new_v4(),
            requester,
            addressee,
            status: ConnectionStatus::Pending,
        };
        connection.validate()?;
        Ok(connection)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id("id", self.id)?;
        check_id("requester", self.requester)?;
        check_id("addressee", self.addressee)?;
        if self.requester == self.addressee {
            return Err(ValidationError::UnexpectedField("addressee"));
        }
        Ok(())
    }

    /// Returns the id of the other party from `user`'s point of view.
    pub fn counterpart(&self, user: UserId) -> UserId {
        if self.requester == user {
            self.addressee
        } else {
            self.requester
        }
    }

    pub fn involves(&self, user: UserId) -> bool {
        self.requester == user || self.addressee == user
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_email, Connection, Profile};
    use crate::model::ValidationError;
    use uuid::Uuid;

    #[test]
    fn email_is_lowercased_and_checked() {
        assert_eq!(normalize_email(" Sam@Example.COM ").unwrap(), "sam@example.com");
        assert!(matches!(
            normalize_email("not-an-email"),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn self_connection_is_rejected() {
        let user = Uuid::new_v4();
        assert!(Connection::request(user, user).is_err());
    }

    #[test]
    fn profile_blank_fields_collapse() {
        let profile = Profile {
            user_id: Uuid::new_v4(),
            full_name: Some("  ".to_string()),
            ..Profile::default()
        }
        .normalized()
        .unwrap();
        assert_eq!(profile.full_name, None);
    }
}
