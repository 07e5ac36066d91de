//! Shared-expense payment ledger records.
//!
//! Amounts are integer cents to keep ledger sums exact.

use crate::model::{check_id, check_length, required_text, UserId, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PaymentId = Uuid;

/// Largest accepted amount: 999,999.99.
pub const MAX_AMOUNT_CENTS: i64 = 99_999_999;
pub const PAYMENT_DESCRIPTION_MAX_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentDirection {
    Sent,
    Received,
}

impl PaymentDirection {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub owner: UserId,
    pub amount_cents: i64,
    pub description: String,
    #[serde(rename = "type")]
    pub direction: PaymentDirection,
    pub status: PaymentStatus,
}

impl Payment {
    /// Records an outgoing payment, completed immediately.
    pub fn sent(owner: UserId, amount_cents: i64, description: &str) -> Result<Self, ValidationError> {
        let payment = Self {
            id: Uuid::new_v4(),
            owner,
            amount_cents,
            description: required_text("description", description, PAYMENT_DESCRIPTION_MAX_CHARS)?,
            direction: PaymentDirection::Sent,
            status: PaymentStatus::Completed,
        };
        payment.validate()?;
        Ok(payment)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_id("id", self.id)?;
        check_id("owner", self.owner)?;
        check_amount(self.amount_cents)?;
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyField("description"));
        }
        check_length("description", &self.description, PAYMENT_DESCRIPTION_MAX_CHARS)
    }
}

pub(crate) fn check_amount(amount_cents: i64) -> Result<(), ValidationError> {
    if amount_cents <= 0 || amount_cents > MAX_AMOUNT_CENTS {
        return Err(ValidationError::AmountOutOfRange(amount_cents));
    }
    Ok(())
}

/// Parses a user-typed decimal amount such as `12`, `12.5` or `12.50` into cents.
///
/// Returns `None` for negative values, more than two decimals, or non-numeric input.
pub fn parse_amount_cents(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if whole.is_empty() || fraction.len() > 2 {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    let whole: i64 = whole.parse().ok()?;
    let fraction: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().ok()? * 10,
        _ => fraction.parse().ok()?,
    };
    whole.checked_mul(100)?.checked_add(fraction)
}

#[cfg(test)]
mod tests {
    use super::{parse_amount_cents, Payment, PaymentDirection, PaymentStatus, MAX_AMOUNT_CENTS};
    use crate::model::ValidationError;
    use uuid::Uuid;

    #[test]
    fn amount_bounds_are_enforced() {
        let owner = Uuid::new_v4();
        assert_eq!(
            Payment::sent(owner, 0, "lunch").unwrap_err(),
            ValidationError::AmountOutOfRange(0)
        );
        assert!(Payment::sent(owner, MAX_AMOUNT_CENTS, "tuition").is_ok());
        assert!(Payment::sent(owner, MAX_AMOUNT_CENTS + 1, "tuition").is_err());
    }

    #[test]
    fn sent_payment_is_completed() {
        let payment = Payment::sent(Uuid::new_v4(), 1250, " soccer fees ").unwrap();
        assert_eq!(payment.direction, PaymentDirection::Sent);
        assert_eq!(payment.status, PaymentStatus::Completed);
        assert_eq!(payment.description, "soccer fees");
    }

    #[test]
    fn parse_amount_handles_decimals() {
        assert_eq!(parse_amount_cents("12"), Some(1200));
        assert_eq!(parse_amount_cents("12.5"), Some(1250));
        assert_eq!(parse_amount_cents("0.07"), Some(7));
        assert_eq!(parse_amount_cents("1.234"), None);
        assert_eq!(parse_amount_cents("-3"), None);
        assert_eq!(parse_amount_cents("abc"), None);
    }
}
