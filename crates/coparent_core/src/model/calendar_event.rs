//! Calendar event domain model.
//!
//! # Responsibility
//! - Define anchor/instance calendar records and their enumerations.
//! - Validate the recurrence invariants before anything is persisted.
//!
//! # Invariants
//! - `recurrence_rule == None` implies `recurrence_end_date == None`.
//! - `recurrence_rule != None` implies `recurrence_end_date >= event_date`.
//! - An instance (`parent_event_id` set) never recurs itself.

use crate::model::{check_id, check_length, optional_text, required_text, UserId, ValidationError};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Stable identifier of one calendar row (anchor or instance).
pub type EventId = Uuid;

pub const EVENT_TITLE_MAX_CHARS: usize = 100;
pub const EVENT_DESCRIPTION_MAX_CHARS: usize = 500;

/// Fixed event categories shown in the shared calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Pickup,
    Medical,
    /// Custody exchange between parents.
    Custody,
    School,
    Activity,
    Other,
}

impl EventCategory {
    pub const ALL: [EventCategory; 6] = [
        Self::Pickup,
        Self::Medical,
        Self::Custody,
        Self::School,
        Self::Activity,
        Self::Other,
    ];

    /// Stable string id used in storage and CLI input.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pickup => "pickup",
            Self::Medical => "medical",
            Self::Custody => "custody",
            Self::School => "school",
            Self::Activity => "activity",
            Self::Other => "other",
        }
    }
}

/// Fixed-interval pattern governing instance generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrenceRule {
    #[default]
    None,
    Daily,
    Weekly,
    Biweekly,
    Monthly,
}

impl RecurrenceRule {
    pub const ALL: [RecurrenceRule; 5] = [
        Self::None,
        Self::Daily,
        Self::Weekly,
        Self::Biweekly,
        Self::Monthly,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
        }
    }

    pub fn is_recurring(self) -> bool {
        self != Self::None
    }
}

/// Unknown enumeration string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl Display for ParseEnumError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown {} `{}`", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

impl FromStr for EventCategory {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == normalized)
            .ok_or(ParseEnumError {
                kind: "event category",
                value: value.to_string(),
            })
    }
}

impl FromStr for RecurrenceRule {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|rule| rule.as_str() == normalized)
            .ok_or(ParseEnumError {
                kind: "recurrence rule",
                value: value.to_string(),
            })
    }
}

/// Caller input for creating one (possibly recurring) event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCalendarEvent {
    pub title: String,
    pub description: Option<String>,
    pub event_date: NaiveDate,
    pub event_time: Option<NaiveTime>,
    pub category: EventCategory,
    pub recurrence_rule: RecurrenceRule,
    pub recurrence_end_date: Option<NaiveDate>,
}

impl NewCalendarEvent {
    /// Single, non-recurring event with no description or time.
    pub fn single(title: impl Into<String>, event_date: NaiveDate, category: EventCategory) -> Self {
        Self {
            title: title.into(),
            description: None,
            event_date,
            event_time: None,
            category,
            recurrence_rule: RecurrenceRule::None,
            recurrence_end_date: None,
        }
    }

    /// Turns this request into a recurring one ending on `until` (inclusive).
    pub fn repeating(mut self, rule: RecurrenceRule, until: NaiveDate) -> Self {
        self.recurrence_rule = rule;
        self.recurrence_end_date = Some(until);
        self
    }
}

/// Canonical calendar record.
///
/// Anchors carry the recurrence rule; instances point back at their anchor
/// through `parent_event_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: EventId,
    pub owner: UserId,
    pub title: String,
    pub description: Option<String>,
    /// Anchor date for a series, occurrence date for an instance.
    pub event_date: NaiveDate,
    pub event_time: Option<NaiveTime>,
    #[serde(rename = "type")]
    pub category: EventCategory,
    pub recurrence_rule: RecurrenceRule,
    pub recurrence_end_date: Option<NaiveDate>,
    pub parent_event_id: Option<EventId>,
}

impl CalendarEvent {
    /// Builds a validated anchor event with a generated id from caller input.
    ///
    /// Text fields are trimmed; a blank description becomes `None`.
    ///
    /// # Errors
    /// - Any rule checked by [`CalendarEvent::validate`].
    pub fn from_request(owner: UserId, request: &NewCalendarEvent) -> Result<Self, ValidationError> {
        let event = Self {
            id: Uuid::new_v4(),
            owner,
            title: required_text("title", &request.title, EVENT_TITLE_MAX_CHARS)?,
            description: optional_text(
                "description",
                request.description.as_deref(),
                EVENT_DESCRIPTION_MAX_CHARS,
            )?,
            event_date: request.event_date,
            event_time: request.event_time,
            category: request.category,
            recurrence_rule: request.recurrence_rule,
            recurrence_end_date: request.recurrence_end_date,
            parent_event_id: None,
        };
        event.validate()?;
        Ok(event)
    }

    /// Checks record invariants without modifying the record.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id("id", self.id)?;
        check_id("owner", self.owner)?;
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyField("title"));
        }
        check_length("title", &self.title, EVENT_TITLE_MAX_CHARS)?;
        if let Some(description) = self.description.as_deref() {
            check_length("description", description, EVENT_DESCRIPTION_MAX_CHARS)?;
        }

        match (self.recurrence_rule.is_recurring(), self.recurrence_end_date) {
            (true, None) => return Err(ValidationError::MissingField("recurrence_end_date")),
            (true, Some(end)) if end < self.event_date => {
                return Err(ValidationError::RecurrenceEndBeforeStart {
                    start: self.event_date,
                    end,
                })
            }
            (false, Some(_)) => return Err(ValidationError::UnexpectedField("recurrence_end_date")),
            _ => {}
        }

        if let Some(parent) = self.parent_event_id {
            check_id("parent_event_id", parent)?;
            if parent == self.id {
                return Err(ValidationError::UnexpectedField("parent_event_id"));
            }
            if self.recurrence_rule.is_recurring() {
                return Err(ValidationError::RecurringInstance);
            }
        }
        Ok(())
    }

    /// Whether this row is an anchor that generated (or may generate) instances.
    pub fn is_recurring(&self) -> bool {
        self.recurrence_rule.is_recurring()
    }

    /// Whether this row was materialized from an anchor.
    pub fn is_instance(&self) -> bool {
        self.parent_event_id.is_some()
    }
}
