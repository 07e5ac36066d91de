//! Favor requests between connected parents.
//!
//! # Invariants
//! - A favor never targets its own requester.
//! - Status only moves forward: `pending -> accepted | declined`,
//!   `accepted -> completed`.

use crate::model::calendar_event::ParseEnumError;
use crate::model::{check_id, check_length, optional_text, required_text, UserId, ValidationError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

pub type FavorId = Uuid;

pub const FAVOR_TITLE_MAX_CHARS: usize = 100;
pub const FAVOR_DESCRIPTION_MAX_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FavorStatus {
    Pending,
    Accepted,
    Declined,
    Completed,
}

impl FavorStatus {
    pub const ALL: [FavorStatus; 4] = [
        Self::Pending,
        Self::Accepted,
        Self::Declined,
        Self::Completed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }

    pub fn can_become(self, next: FavorStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Accepted)
                | (Self::Pending, Self::Declined)
                | (Self::Accepted, Self::Completed)
        )
    }
}

impl FromStr for FavorStatus {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(&value.trim().to_ascii_lowercase()).ok_or(ParseEnumError {
            kind: "favor status",
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favor {
    pub id: FavorId,
    pub requester: UserId,
    pub responder: UserId,
    pub title: String,
    pub description: Option<String>,
    pub status: FavorStatus,
}

impl Favor {
    /// Opens a pending favor asked of `responder`.
    pub fn request(
        requester: UserId,
        responder: UserId,
        title: &str,
        description: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let favor = Self {
            id: Uuid::new_v4(),
            requester,
            responder,
            title: required_text("title", title, FAVOR_TITLE_MAX_CHARS)?,
            description: optional_text("description", description, FAVOR_DESCRIPTION_MAX_CHARS)?,
            status: FavorStatus::Pending,
        };
        favor.validate()?;
        Ok(favor)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id("id", self.id)?;
        check_id("requester", self.requester)?;
        check_id("responder", self.responder)?;
        if self.requester == self.responder {
            return Err(ValidationError::UnexpectedField("responder"));
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        check_length("title", &self.title, FAVOR_TITLE_MAX_CHARS)?;
        if let Some(description) = &self.description {
            check_length("description", description, FAVOR_DESCRIPTION_MAX_CHARS)?;
        }
        Ok(())
    }

    pub fn involves(&self, user: UserId) -> bool {
        self.requester == user || self.responder == user
    }
}

#[cfg(test)]
mod tests {
    use super::{Favor, FavorStatus};
    use crate::model::ValidationError;
    use uuid::Uuid;

    #[test]
    fn request_trims_and_starts_pending() {
        let favor = Favor::request(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "  Pick up groceries ",
            Some("   "),
        )
        .unwrap();
        assert_eq!(favor.title, "Pick up groceries");
        assert_eq!(favor.description, None);
        assert_eq!(favor.status, FavorStatus::Pending);
    }

    #[test]
    fn favor_to_self_is_rejected() {
        let user = Uuid::new_v4();
        assert_eq!(
            Favor::request(user, user, "Swap weekend", None).unwrap_err(),
            ValidationError::UnexpectedField("responder")
        );
    }

    #[test]
    fn status_moves_forward_only() {
        use FavorStatus::*;
        assert!(Pending.can_become(Accepted));
        assert!(Pending.can_become(Declined));
        assert!(Accepted.can_become(Completed));
        assert!(!Pending.can_become(Completed));
        assert!(!Declined.can_become(Accepted));
        assert!(!Completed.can_become(Pending));
        assert!(!Accepted.can_become(Accepted));
        assert_eq!(" Declined ".parse::<FavorStatus>().unwrap(), Declined);
    }
}
