//! Payment ledger use-cases.

use crate::capability::AuthProvider;
use crate::model::payment::{
    check_amount, Payment, PaymentDirection, PaymentId, PAYMENT_DESCRIPTION_MAX_CHARS,
};
use crate::model::required_text;
use crate::repo::payment_repo::PaymentRepository;
use crate::service::{require_user, ServiceError, ServiceResult};
use log::info;

/// Editable fields of an existing payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentUpdate {
    pub amount_cents: i64,
    pub description: String,
    pub direction: PaymentDirection,
}

pub struct PaymentService<R: PaymentRepository, A: AuthProvider> {
    repo: R,
    auth: A,
}

impl<R: PaymentRepository, A: AuthProvider> PaymentService<R, A> {
    pub fn new(repo: R, auth: A) -> Self {
        Self { repo, auth }
    }

    /// Records a completed outgoing payment.
    pub fn send_payment(&self, amount_cents: i64, description: &str) -> ServiceResult<Payment> {
        let owner = require_user(&self.auth)?;
        let payment = Payment::sent(owner, amount_cents, description)?;
        self.repo.create_payment(&payment)?;
        info!(
            "event=payment_create module=service status=ok payment_id={}",
            payment.id
        );
        Ok(payment)
    }

    /// Replaces amount, description and direction; status is kept.
    pub fn update_payment(&self, id: PaymentId, update: &PaymentUpdate) -> ServiceResult<Payment> {
        let owner = require_user(&self.auth)?;
        let mut payment = match self.repo.get_payment(id)? {
            Some(payment) if payment.owner == owner => payment,
            _ => return Err(ServiceError::NotFound(id)),
        };

        check_amount(update.amount_cents)?;
        payment.amount_cents = update.amount_cents;
        payment.description =
            required_text("description", &update.description, PAYMENT_DESCRIPTION_MAX_CHARS)?;
        payment.direction = update.direction;

        self.repo.update_payment(&payment)?;
        info!("event=payment_update module=service status=ok payment_id={id}");
        Ok(payment)
    }

    /// Newest first.
    pub fn list_payments(&self) -> ServiceResult<Vec<Payment>> {
        let owner = require_user(&self.auth)?;
        Ok(self.repo.list_payments(owner)?)
    }

    /// Completed received minus completed sent, in cents.
    pub fn balance_cents(&self) -> ServiceResult<i64> {
        let owner = require_user(&self.auth)?;
        Ok(self.repo.completed_balance(owner)?)
    }
}

/// Formats cents as a signed decimal amount, e.g. `-12.05`.
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let magnitude = cents.unsigned_abs();
    format!("{sign}{}.{:02}", magnitude / 100, magnitude % 100)
}

#[cfg(test)]
mod tests {
    use super::format_cents;

    #[test]
    fn format_cents_pads_fraction() {
        assert_eq!(format_cents(1205), "12.05");
        assert_eq!(format_cents(-7), "-0.07");
        assert_eq!(format_cents(0), "0.00");
    }
}
