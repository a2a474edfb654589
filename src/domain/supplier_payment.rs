//! Supplier payment record with per-document allocations
//!
//! A single payment to a supplier is allocated across payable invoices
//! and/or purchases; the allocation details stay on the payment so it can
//! be reversed later.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment::PaymentMethod;
use crate::impl_record;

/// What a payment share was applied to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum AllocationTarget {
    Invoice(Uuid),
    Purchase(Uuid),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentAllocation {
    #[serde(flatten)]
    pub target: AllocationTarget,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SupplierPayment {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Sequential code, "FPAG-000001" onwards
    pub code: String,
    pub supplier_id: Uuid,
    pub payment_date: DateTime<Utc>,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub user_id: Uuid,
    pub allocations: Vec<PaymentAllocation>,
}

impl_record!(SupplierPayment, "supplier payment");

impl SupplierPayment {
    /// Format the next sequential payment code.
    pub fn code_for(sequence: u32) -> String {
        format!("FPAG-{sequence:06}")
    }

    /// Parse the numeric part of a payment code. Returns 0 for foreign
    /// formats so sequence scanning can skip them.
    pub fn code_sequence(code: &str) -> u32 {
        code.strip_prefix("FPAG-")
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }
}
