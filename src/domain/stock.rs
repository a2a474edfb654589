//! Stock levels and movements
//!
//! A `StockLevel` holds the current quantity per product; every change
//! goes through a `StockMovement` so the history stays auditable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_record;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StockLevel {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    pub product_id: Uuid,
    pub quantity: i64,
}

impl_record!(StockLevel, "stock level");

impl StockLevel {
    pub fn new(product_id: Uuid, quantity: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            product_id,
            quantity,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    pub product_id: Uuid,
    pub movement_type: MovementType,
    /// Signed quantity change applied to the stock level
    pub quantity: i64,
    pub reason: Option<String>,
    pub user_id: Uuid,
    pub movement_date: DateTime<Utc>,
}

impl_record!(StockMovement, "stock movement");

impl StockMovement {
    pub fn new(
        product_id: Uuid,
        movement_type: MovementType,
        quantity: i64,
        reason: Option<String>,
        user_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            product_id,
            movement_type,
            quantity,
            reason,
            user_id,
            movement_date: now,
        }
    }
}
