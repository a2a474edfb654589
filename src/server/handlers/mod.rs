//! HTTP handlers, one module per resource.

pub mod cash;
pub mod clients;
pub mod inventory;
pub mod invoices;
pub mod purchases;
pub mod receivables;
pub mod supplier_invoices;
pub mod supplier_payments;
pub mod suppliers;

use uuid::Uuid;

use crate::core::error::{AppResult, ValidationError};

/// Parse a path segment as a UUID, rejecting with the standard envelope.
pub(crate) fn parse_id(value: &str) -> AppResult<Uuid> {
    value.parse().map_err(|_| {
        ValidationError::InvalidUuid {
            value: value.to_string(),
        }
        .into()
    })
}
