//! Client (CRM) record

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_record;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    pub name: String,
    /// Tax or national identification number
    pub identification: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    /// Maximum credit the client may carry
    pub credit_limit: Decimal,
    /// Default term in days for credit invoices
    pub credit_days: i32,
    pub active: bool,
}

impl_record!(Client, "client");

impl Client {
    pub fn new(name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            name,
            identification: None,
            email: None,
            phone: None,
            address: None,
            credit_limit: Decimal::ZERO,
            credit_days: 30,
            active: true,
        }
    }
}
