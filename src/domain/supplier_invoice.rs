//! Payable (supplier) invoice record
//!
//! Unlike receivable invoices, payables track `paid` explicitly: the
//! invariant is `balance = total - paid`. Status runs
//! PENDING -> PARTIAL -> PAID, with OVERDUE derived from the due date
//! while a balance remains. Payments can be reversed, walking the status
//! back the same way.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::entity::Record;
use crate::impl_record;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PayableStatus {
    Pending,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SupplierInvoice {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Supplier's document number
    pub number: String,
    pub supplier_id: Uuid,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub total: Decimal,
    pub paid: Decimal,
    pub balance: Decimal,
    pub status: PayableStatus,
    pub notes: Option<String>,
}

impl_record!(SupplierInvoice, "supplier invoice");

impl SupplierInvoice {
    pub fn new(
        number: String,
        supplier_id: Uuid,
        total: Decimal,
        issue_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            number,
            supplier_id,
            issue_date,
            due_date,
            total,
            paid: Decimal::ZERO,
            balance: total,
            status: PayableStatus::Pending,
            notes: None,
        }
    }

    pub fn is_payable(&self) -> bool {
        self.balance > Decimal::ZERO
            && matches!(
                self.status,
                PayableStatus::Pending | PayableStatus::Partial | PayableStatus::Overdue
            )
    }

    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        if self.due_date < now {
            (now - self.due_date).num_days()
        } else {
            0
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.balance > Decimal::ZERO && self.days_overdue(now) > 0
    }

    /// Record a payment allocation against this invoice.
    pub fn apply_payment(&mut self, amount: Decimal, now: DateTime<Utc>) {
        self.paid = (self.paid + amount).min(self.total);
        self.balance = self.total - self.paid;
        self.status = self.derive_status(now);
        self.touch();
    }

    /// Undo a previously applied allocation (payment reversal).
    pub fn revert_payment(&mut self, amount: Decimal, now: DateTime<Utc>) {
        self.paid = (self.paid - amount).max(Decimal::ZERO);
        self.balance = self.total - self.paid;
        self.status = self.derive_status(now);
        self.touch();
    }

    fn derive_status(&self, now: DateTime<Utc>) -> PayableStatus {
        if self.balance.is_zero() {
            PayableStatus::Paid
        } else if self.is_overdue(now) {
            PayableStatus::Overdue
        } else if self.paid > Decimal::ZERO {
            PayableStatus::Partial
        } else {
            PayableStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn payable(total_cents: i64, due_in_days: i64) -> SupplierInvoice {
        let now = Utc::now();
        SupplierInvoice::new(
            "A-100".to_string(),
            Uuid::new_v4(),
            Decimal::new(total_cents, 2),
            now,
            now + Duration::days(due_in_days),
        )
    }

    #[test]
    fn pending_to_partial_to_paid() {
        let now = Utc::now();
        let mut inv = payable(20000, 30);
        assert_eq!(inv.status, PayableStatus::Pending);

        inv.apply_payment(Decimal::new(5000, 2), now);
        assert_eq!(inv.status, PayableStatus::Partial);
        assert_eq!(inv.balance, Decimal::new(15000, 2));

        inv.apply_payment(Decimal::new(15000, 2), now);
        assert_eq!(inv.status, PayableStatus::Paid);
        assert!(inv.balance.is_zero());
    }

    #[test]
    fn reversal_restores_pending() {
        let now = Utc::now();
        let mut inv = payable(20000, 30);
        inv.apply_payment(Decimal::new(20000, 2), now);
        assert_eq!(inv.status, PayableStatus::Paid);

        inv.revert_payment(Decimal::new(20000, 2), now);
        assert_eq!(inv.status, PayableStatus::Pending);
        assert_eq!(inv.balance, inv.total);
        assert!(inv.paid.is_zero());
    }

    #[test]
    fn reversal_on_late_invoice_derives_overdue() {
        let now = Utc::now();
        let mut inv = payable(20000, -5);
        inv.apply_payment(Decimal::new(20000, 2), now);
        inv.revert_payment(Decimal::new(10000, 2), now);
        assert_eq!(inv.status, PayableStatus::Overdue);
    }
}
