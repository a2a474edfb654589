//! Receivable payment record
//!
//! One payment row per invoice share: a client payment distributed across
//! three invoices produces three rows sharing reference and date.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_record;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Transfer,
    Card,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    pub client_id: Uuid,
    pub invoice_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub payment_date: DateTime<Utc>,
    pub observations: Option<String>,
    /// User that registered the payment
    pub user_id: Uuid,
}

impl_record!(Payment, "payment");

impl Payment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        client_id: Uuid,
        invoice_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
        reference: Option<String>,
        payment_date: DateTime<Utc>,
        observations: Option<String>,
        user_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            client_id,
            invoice_id,
            amount,
            method,
            reference,
            payment_date,
            observations,
            user_id,
        }
    }
}
