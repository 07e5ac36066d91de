//! Domain records for the co-parenting workspace.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Own field-level validation shared by repositories and services.
//!
//! # Invariants
//! - Every persisted record is identified by a non-nil UUID.
//! - Free-text fields are stored trimmed; empty optional text is `None`.

pub mod calendar_event;
pub mod child;
pub mod connection;
pub mod favor;
pub mod message;
pub mod payment;

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identity issued by the auth provider for one signed-in user.
pub type UserId = Uuid;

/// Field-level validation failure for any domain record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Identifier field is the nil UUID.
    NilId(&'static str),
    /// Required text is empty after trimming.
    EmptyField(&'static str),
    /// Text exceeds its character budget.
    FieldTooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
    /// Field required by another field's value is absent.
    MissingField(&'static str),
    /// Field must be absent given another field's value.
    UnexpectedField(&'static str),
    /// Recurrence end date precedes the anchor date.
    RecurrenceEndBeforeStart { start: NaiveDate, end: NaiveDate },
    /// A generated instance carries its own recurrence rule.
    RecurringInstance,
    /// Monetary amount outside `1..=MAX_AMOUNT_CENTS`.
    AmountOutOfRange(i64),
    /// Email text does not look like an address.
    InvalidEmail(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId(field) => write!(f, "{field} must not be the nil uuid"),
            Self::EmptyField(field) => write!(f, "{field} is required"),
            Self::FieldTooLong { field, max, actual } => {
                write!(f, "{field} must be at most {max} characters, got {actual}")
            }
            Self::MissingField(field) => write!(f, "{field} is required"),
            Self::UnexpectedField(field) => write!(f, "{field} must not be set"),
            Self::RecurrenceEndBeforeStart { start, end } => write!(
                f,
                "recurrence end date {end} must not precede event date {start}"
            ),
            Self::RecurringInstance => {
                write!(f, "generated instances must not carry a recurrence rule")
            }
            Self::AmountOutOfRange(cents) => write!(
                f,
                "amount must be greater than 0 and at most 999999.99, got {cents} cents"
            ),
            Self::InvalidEmail(value) => write!(f, "invalid email address `{value}`"),
        }
    }
}

impl Error for ValidationError {}

/// Trims required text and checks it against `max` characters.
pub(crate) fn required_text(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    check_length(field, trimmed, max)?;
    Ok(trimmed.to_string())
}

/// Trims optional text; blank input collapses to `None`.
pub(crate) fn optional_text(
    field: &'static str,
    value: Option<&str>,
    max: usize,
) -> Result<Option<String>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(trimmed) => {
            check_length(field, trimmed, max)?;
            Ok(Some(trimmed.to_string()))
        }
    }
}

pub(crate) fn check_length(
    field: &'static str,
    value: &str,
    max: usize,
) -> Result<(), ValidationError> {
    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::FieldTooLong { field, max, actual });
    }
    Ok(())
}

pub(crate) fn check_id(field: &'static str, id: Uuid) -> Result<(), ValidationError> {
    if id.is_nil() {
        return Err(ValidationError::NilId(field));
    }
    Ok(())
}
