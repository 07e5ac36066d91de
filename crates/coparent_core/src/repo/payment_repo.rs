//! Payment ledger persistence.

use crate::model::payment::{Payment, PaymentDirection, PaymentId, PaymentStatus};
use crate::model::UserId;
use crate::repo::{parse_enum, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const PAYMENT_SELECT_SQL: &str = "SELECT
    id,
    owner,
    amount_cents,
    description,
    direction,
    status
FROM payments";

pub trait PaymentRepository {
    fn create_payment(&self, payment: &Payment) -> RepoResult<PaymentId>;
    fn update_payment(&self, payment: &Payment) -> RepoResult<()>;
    fn get_payment(&self, id: PaymentId) -> RepoResult<Option<Payment>>;
    /// Newest first.
    fn list_payments(&self, owner: UserId) -> RepoResult<Vec<Payment>>;
    /// Sum of completed received minus completed sent, in cents.
    fn completed_balance(&self, owner: UserId) -> RepoResult<i64>;
}

pub struct SqlitePaymentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePaymentRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl PaymentRepository for SqlitePaymentRepository<'_> {
    fn create_payment(&self, payment: &Payment) -> RepoResult<PaymentId> {
        payment.validate()?;
        self.conn.execute(
            "INSERT INTO payments (id, owner, amount_cents, description, direction, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                payment.id.to_string(),
                payment.owner.to_string(),
                payment.amount_cents,
                payment.description.as_str(),
                payment.direction.as_str(),
                payment.status.as_str(),
            ],
        )?;
        Ok(payment.id)
    }

    fn update_payment(&self, payment: &Payment) -> RepoResult<()> {
        payment.validate()?;
        let changed = self.conn.execute(
            "UPDATE payments
             SET
                amount_cents = ?1,
                description = ?2,
                direction = ?3,
                status = ?4,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?5;",
            params![
                payment.amount_cents,
                payment.description.as_str(),
                payment.direction.as_str(),
                payment.status.as_str(),
                payment.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(payment.id));
        }
        Ok(())
    }

    fn get_payment(&self, id: PaymentId) -> RepoResult<Option<Payment>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PAYMENT_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_payment_row(row)?)),
            None => Ok(None),
        }
    }

    fn list_payments(&self, owner: UserId) -> RepoResult<Vec<Payment>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PAYMENT_SELECT_SQL}
             WHERE owner = ?1
             ORDER BY created_at DESC, rowid DESC;"
        ))?;
        let mut rows = stmt.query([owner.to_string()])?;
        let mut payments = Vec::new();
        while let Some(row) = rows.next()? {
            payments.push(parse_payment_row(row)?);
        }
        Ok(payments)
    }

    fn completed_balance(&self, owner: UserId) -> RepoResult<i64> {
        let balance: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(
                CASE direction WHEN 'received' THEN amount_cents ELSE -amount_cents END
             ), 0)
             FROM payments
             WHERE owner = ?1
               AND status = 'completed';",
            [owner.to_string()],
            |row| row.get(0),
        )?;
        Ok(balance)
    }
}

fn parse_payment_row(row: &Row<'_>) -> RepoResult<Payment> {
    let id: String = row.get("id")?;
    let owner: String = row.get("owner")?;
    let direction: String = row.get("direction")?;
    let status: String = row.get("status")?;
    let payment = Payment {
        id: parse_uuid(&id, "payments.id")?,
        owner: parse_uuid(&owner, "payments.owner")?,
        amount_cents: row.get("amount_cents")?,
        description: row.get("description")?,
        direction: parse_enum(&direction, "payments.direction", PaymentDirection::parse)?,
        status: parse_enum(&status, "payments.status", PaymentStatus::parse)?,
    };
    payment.validate()?;
    Ok(payment)
}
