//! Children registry and memory journal records.
//!
//! # Invariants
//! - A memory entry always references a child owned by the same user.
//! - `photo` entries carry an image URL; `milestone` entries carry a date.

use crate::model::{check_id, check_length, optional_text, required_text, UserId, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type ChildId = Uuid;
pub type MemoryEntryId = Uuid;

pub const CHILD_NAME_MAX_CHARS: usize = 100;
pub const MEMORY_TITLE_MAX_CHARS: usize = 100;
pub const MEMORY_CONTENT_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub id: ChildId,
    pub owner: UserId,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
}

impl Child {
    /// Creates a validated child record with a generated id.
    pub fn new(
        owner: UserId,
        name: &str,
        date_of_birth: Option<NaiveDate>,
    ) -> Result<Self, ValidationError> {
        let child = Self {
            id: Uuid::new_v4(),
            owner,
            name: required_text("name", name, CHILD_NAME_MAX_CHARS)?,
            date_of_birth,
        };
        child.validate()?;
        Ok(child)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id("id", self.id)?;
        check_id("owner", self.owner)?;
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyField("name"));
        }
        check_length("name", &self.name, CHILD_NAME_MAX_CHARS)
    }
}

/// Journal entry flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryEntryType {
    Photo,
    Note,
    Milestone,
}

impl MemoryEntryType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Photo => "photo",
            Self::Note => "note",
            Self::Milestone => "milestone",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "photo" => Some(Self::Photo),
            "note" => Some(Self::Note),
            "milestone" => Some(Self::Milestone),
            _ => None,
        }
    }
}

/// Caller input for one journal entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMemoryEntry {
    pub child_id: ChildId,
    pub title: String,
    pub content: Option<String>,
    pub entry_type: MemoryEntryType,
    pub image_url: Option<String>,
    pub milestone_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub id: MemoryEntryId,
    pub child_id: ChildId,
    pub owner: UserId,
    pub title: String,
    pub content: Option<String>,
    pub entry_type: MemoryEntryType,
    pub image_url: Option<String>,
    pub milestone_date: Option<NaiveDate>,
}

impl MemoryEntry {
    pub fn from_request(owner: UserId, request: &NewMemoryEntry) -> Result<Self, ValidationError> {
        let entry = Self {
            id: Uuid::new_v4(),
            child_id: request.child_id,
            owner,
            title: required_text("title", &request.title, MEMORY_TITLE_MAX_CHARS)?,
            content: optional_text(
                "content",
                request.content.as_deref(),
                MEMORY_CONTENT_MAX_CHARS,
            )?,
            entry_type: request.entry_type,
            image_url: optional_text("image_url", request.image_url.as_deref(), 2048)?,
            milestone_date: request.milestone_date,
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id("id", self.id)?;
        check_id("child_id", self.child_id)?;
        check_id("owner", self.owner)?;
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        check_length("title", &self.title, MEMORY_TITLE_MAX_CHARS)?;
        if let Some(content) = self.content.as_deref() {
            check_length("content", content, MEMORY_CONTENT_MAX_CHARS)?;
        }
        match self.entry_type {
            MemoryEntryType::Photo if self.image_url.is_none() => {
                Err(ValidationError::MissingField("image_url"))
            }
            MemoryEntryType::Milestone if self.milestone_date.is_none() => {
                Err(ValidationError::MissingField("milestone_date"))
            }
            _ => Ok(()),
        }
    }
}
