//! Product record

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_record;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Unique per tenant
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub cost: Decimal,
    pub price: Decimal,
    /// Sales tax rate as a fraction (0.18 for 18%)
    pub tax_rate: Decimal,
    /// Threshold for low-stock alerts
    pub min_stock: i64,
    pub active: bool,
}

impl_record!(Product, "product");

impl Product {
    pub fn new(code: String, name: String, cost: Decimal, price: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            code,
            name,
            description: None,
            category_id: None,
            cost,
            price,
            tax_rate: Decimal::ZERO,
            min_stock: 0,
            active: true,
        }
    }
}
