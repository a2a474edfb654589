//! Receivable invoices
//!
//! The seeding surface the reconciliation endpoints operate on:
//! - GET /api/v1/invoices - List invoices (status/client filters)
//! - POST /api/v1/invoices - Issue an invoice
//! - GET /api/v1/invoices/{id} - Get an invoice
//! - POST /api/v1/invoices/{id}/cancel - Cancel (blocked once paid against)

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::core::entity::Record;
use crate::core::error::{AppResult, EntityError, PaymentError};
use crate::core::money::to_cents;
use crate::core::pagination::{PageQuery, Paginated};
use crate::domain::{Invoice, InvoiceStatus, PaymentTerms};
use crate::server::extract::{CurrentUser, Tenant};
use crate::server::handlers::parse_id;
use crate::storage::Ledger;

#[derive(Debug, Deserialize)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub client_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub client_id: Uuid,
    pub total: Decimal,
    pub payment_terms: PaymentTerms,
    #[serde(default)]
    pub ncf: Option<String>,
    #[serde(default)]
    pub issue_date: Option<DateTime<Utc>>,
    /// Defaults to issue date plus the client's credit days on credit terms
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

pub async fn list_invoices(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<InvoiceFilter>,
) -> AppResult<Json<Paginated<Invoice>>> {
    let now = Utc::now();
    let result = store.read(|ledger| {
        let mut rows: Vec<Invoice> = ledger
            .invoices
            .iter()
            .filter(|inv| filter.client_id.is_none_or(|id| inv.client_id == id))
            .filter(|inv| {
                filter
                    .status
                    .is_none_or(|status| inv.effective_status(now) == status)
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.issue_date.cmp(&a.issue_date));
        Paginated::slice(rows, page)
    })?;
    Ok(Json(result))
}

pub async fn create_invoice(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Json(body): Json<CreateInvoiceRequest>,
) -> AppResult<(StatusCode, Json<Invoice>)> {
    let total = to_cents(body.total);
    if total <= Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount.into());
    }

    let invoice = store.transaction(|ledger| {
        let client = ledger.clients.require(&body.client_id)?.clone();

        let issue_date = body.issue_date.unwrap_or_else(Utc::now);
        let due_date = match body.payment_terms {
            PaymentTerms::Cash => body.due_date,
            PaymentTerms::Credit => Some(
                body.due_date
                    .unwrap_or(issue_date + Duration::days(i64::from(client.credit_days))),
            ),
        };

        let mut invoice = Invoice::issue(
            next_invoice_number(ledger),
            body.client_id,
            total,
            body.payment_terms,
            issue_date,
            due_date,
        );
        invoice.ncf = body.ncf.clone();
        Ok(ledger.invoices.insert(invoice))
    })?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn get_invoice(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Invoice>> {
    let id = parse_id(&id)?;
    let invoice = store.read(|ledger| ledger.invoices.require(&id).cloned())??;
    Ok(Json(invoice))
}

pub async fn cancel_invoice(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Invoice>> {
    let id = parse_id(&id)?;
    let invoice = store.transaction(|ledger| {
        let paid_against = ledger.payments.iter().any(|p| p.invoice_id == id);
        let invoice = ledger.invoices.require_mut(&id)?;
        if paid_against || invoice.status == InvoiceStatus::Paid {
            return Err(EntityError::InvalidState {
                entity_type: "invoice",
                id,
                state: format!("{:?}", invoice.status),
                operation: "cancel",
            }
            .into());
        }
        invoice.status = InvoiceStatus::Cancelled;
        invoice.balance = Decimal::ZERO;
        invoice.touch();
        Ok(invoice.clone())
    })?;
    Ok(Json(invoice))
}

/// Next sequential document number, deleted rows included.
fn next_invoice_number(ledger: &Ledger) -> String {
    let next = ledger
        .invoices
        .iter_all()
        .filter_map(|inv| inv.number.strip_prefix("F-"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    format!("F-{next:06}")
}
