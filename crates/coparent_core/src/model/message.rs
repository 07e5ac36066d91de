//! Message log and push-subscription records.

use crate::model::{check_id, check_length, required_text, UserId, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MessageId = Uuid;

pub const MESSAGE_MAX_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageDirection {
    Sent,
    Received,
}

impl MessageDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Received => "received",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sent" => Some(Self::Sent),
            "received" => Some(Self::Received),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub owner: UserId,
    pub direction: MessageDirection,
    pub content: String,
}

impl Message {
    pub fn new(
        owner: UserId,
        direction: MessageDirection,
        content: &str,
    ) -> Result<Self, ValidationError> {
        let message = Self {
            id: Uuid::new_v4(),
            owner,
            direction,
            content: required_text("content", content, MESSAGE_MAX_CHARS)?,
        };
        message.validate()?;
        Ok(message)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id("id", self.id)?;
        check_id("owner", self.owner)?;
        if self.content.trim().is_empty() {
            return Err(ValidationError::EmptyField("content"));
        }
        check_length("content", &self.content, MESSAGE_MAX_CHARS)
    }
}

/// Stored push registration for one device endpoint.
///
/// `payload` is the JSON document produced by the platform push manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub owner: UserId,
    pub endpoint: String,
    pub payload: String,
}
