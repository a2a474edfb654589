//! Supplier record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_record;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Supplier {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    /// Short internal code (e.g., "PROV-001")
    pub code: String,
    pub name: String,
    /// Tax registry number
    pub rnc: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub active: bool,
}

impl_record!(Supplier, "supplier");

impl Supplier {
    pub fn new(code: String, name: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            code,
            name,
            rnc: None,
            email: None,
            phone: None,
            address: None,
            contact_name: None,
            active: true,
        }
    }
}
