//! Purchase order record
//!
//! Purchases carry the same paid/balance tracking as supplier invoices so
//! supplier payments can be allocated against them. Receiving a purchase
//! moves its items into stock.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::entity::Record;
use crate::impl_record;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PurchaseItem {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
}

impl PurchaseItem {
    pub fn subtotal(&self) -> Decimal {
        self.unit_cost * Decimal::from(self.quantity)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Purchase {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Sequential code, "COMP-000001" onwards
    pub code: String,
    pub supplier_id: Uuid,
    pub items: Vec<PurchaseItem>,
    pub total: Decimal,
    pub paid: Decimal,
    pub balance: Decimal,
    pub received: bool,
    pub received_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl_record!(Purchase, "purchase");

impl Purchase {
    pub fn new(code: String, supplier_id: Uuid, items: Vec<PurchaseItem>) -> Self {
        let now = Utc::now();
        let total: Decimal = items.iter().map(PurchaseItem::subtotal).sum();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            code,
            supplier_id,
            items,
            total,
            paid: Decimal::ZERO,
            balance: total,
            received: false,
            received_at: None,
            notes: None,
        }
    }

    pub fn code_for(sequence: u32) -> String {
        format!("COMP-{sequence:06}")
    }

    pub fn code_sequence(code: &str) -> u32 {
        code.strip_prefix("COMP-")
            .and_then(|n| n.parse().ok())
            .unwrap_or(0)
    }

    pub fn apply_payment(&mut self, amount: Decimal) {
        self.paid = (self.paid + amount).min(self.total);
        self.balance = self.total - self.paid;
        self.touch();
    }

    pub fn revert_payment(&mut self, amount: Decimal) {
        self.paid = (self.paid - amount).max(Decimal::ZERO);
        self.balance = self.total - self.paid;
        self.touch();
    }

    pub fn mark_received(&mut self, now: DateTime<Utc>) {
        self.received = true;
        self.received_at = Some(now);
        self.touch();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_item_subtotals() {
        let purchase = Purchase::new(
            Purchase::code_for(1),
            Uuid::new_v4(),
            vec![
                PurchaseItem {
                    product_id: Uuid::new_v4(),
                    quantity: 3,
                    unit_cost: Decimal::new(1050, 2),
                },
                PurchaseItem {
                    product_id: Uuid::new_v4(),
                    quantity: 2,
                    unit_cost: Decimal::new(500, 2),
                },
            ],
        );
        assert_eq!(purchase.total, Decimal::new(4150, 2));
        assert_eq!(purchase.balance, purchase.total);
    }

    #[test]
    fn payment_and_reversal_keep_balance_invariant() {
        let mut purchase = Purchase::new(
            Purchase::code_for(2),
            Uuid::new_v4(),
            vec![PurchaseItem {
                product_id: Uuid::new_v4(),
                quantity: 1,
                unit_cost: Decimal::new(10000, 2),
            }],
        );
        purchase.apply_payment(Decimal::new(4000, 2));
        assert_eq!(purchase.balance, Decimal::new(6000, 2));

        purchase.revert_payment(Decimal::new(4000, 2));
        assert_eq!(purchase.balance, purchase.total);
        assert!(purchase.paid.is_zero());
    }
}
