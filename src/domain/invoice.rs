//! Receivable invoice record and status derivation
//!
//! The balance invariant is `balance = total - sum(applied payments)`.
//! Status follows the balance: ISSUED while untouched, PARTIAL after a
//! partial payment, PAID at zero balance, and OVERDUE whenever an unpaid
//! balance sits past the due date. DRAFT and CANCELLED invoices never
//! take payments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::entity::Record;
use crate::impl_record;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InvoiceStatus {
    Draft,
    Issued,
    Partial,
    Paid,
    Overdue,
    Cancelled,
}

/// Whether the sale was settled on the spot or extends credit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentTerms {
    Cash,
    Credit,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Sequential document number (e.g., "F-000123")
    pub number: String,
    /// Fiscal invoice number (NCF), when issued for tax purposes
    pub ncf: Option<String>,
    pub client_id: Uuid,
    pub issue_date: DateTime<Utc>,
    pub due_date: Option<DateTime<Utc>>,
    pub payment_terms: PaymentTerms,
    pub total: Decimal,
    /// Outstanding amount; `total - balance` is what has been paid
    pub balance: Decimal,
    pub status: InvoiceStatus,
}

impl_record!(Invoice, "invoice");

impl Invoice {
    /// Issue a new invoice with its full balance outstanding.
    pub fn issue(
        number: String,
        client_id: Uuid,
        total: Decimal,
        payment_terms: PaymentTerms,
        issue_date: DateTime<Utc>,
        due_date: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            number,
            ncf: None,
            client_id,
            issue_date,
            due_date,
            payment_terms,
            total,
            balance: total,
            status: InvoiceStatus::Issued,
        }
    }

    pub fn paid_amount(&self) -> Decimal {
        self.total - self.balance
    }

    /// Can this invoice still receive payments?
    pub fn is_payable(&self) -> bool {
        self.balance > Decimal::ZERO
            && matches!(
                self.status,
                InvoiceStatus::Issued | InvoiceStatus::Partial | InvoiceStatus::Overdue
            )
    }

    /// Whole days past the due date. Zero when not yet due or undated.
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        match self.due_date {
            Some(due) if due < now => (now - due).num_days(),
            _ => 0,
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.balance > Decimal::ZERO && self.days_overdue(now) > 0
    }

    /// Status with overdue derivation applied, for display.
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvoiceStatus {
        match self.status {
            InvoiceStatus::Issued | InvoiceStatus::Partial | InvoiceStatus::Overdue => {
                if self.is_overdue(now) {
                    InvoiceStatus::Overdue
                } else {
                    self.status
                }
            }
            other => other,
        }
    }

    /// Reduce the balance by an allocated payment share and recompute status.
    ///
    /// Callers validate `amount <= balance` beforehand; the debit saturates
    /// at zero to keep the invariant even if they do not.
    pub fn apply_payment(&mut self, amount: Decimal, now: DateTime<Utc>) {
        self.balance = (self.balance - amount).max(Decimal::ZERO);
        self.status = if self.balance.is_zero() {
            InvoiceStatus::Paid
        } else if self.is_overdue(now) {
            InvoiceStatus::Overdue
        } else {
            InvoiceStatus::Partial
        };
        self.touch();
    }
}
