//! Supplier (payable) invoices
//!
//! - GET /api/v1/supplier-invoices - List (status/supplier filters)
//! - POST /api/v1/supplier-invoices - Register a payable invoice
//! - GET /api/v1/supplier-invoices/{id} - Get one
//! - PUT /api/v1/supplier-invoices/{id} - Update notes / due date
//! - GET /api/v1/supplier-invoices/stats - Pending and overdue totals

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::entity::Record;
use crate::core::error::{AppResult, EntityError, PaymentError};
use crate::core::money::to_cents;
use crate::core::pagination::{PageQuery, Paginated};
use crate::domain::{PayableStatus, SupplierInvoice};
use crate::server::extract::{CurrentUser, Tenant};
use crate::server::handlers::parse_id;

#[derive(Debug, Deserialize)]
pub struct SupplierInvoiceFilter {
    pub status: Option<PayableStatus>,
    pub supplier_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSupplierInvoiceRequest {
    pub number: String,
    pub supplier_id: Uuid,
    pub total: Decimal,
    pub issue_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSupplierInvoiceRequest {
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SupplierInvoiceStats {
    pub pending_total: Decimal,
    pub overdue_total: Decimal,
    pub pending_count: usize,
    pub overdue_count: usize,
}

pub async fn list_supplier_invoices(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<SupplierInvoiceFilter>,
) -> AppResult<Json<Paginated<SupplierInvoice>>> {
    let result = store.read(|ledger| {
        let mut rows: Vec<SupplierInvoice> = ledger
            .supplier_invoices
            .iter()
            .filter(|inv| filter.supplier_id.is_none_or(|id| inv.supplier_id == id))
            .filter(|inv| filter.status.is_none_or(|status| inv.status == status))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.due_date.cmp(&b.due_date));
        Paginated::slice(rows, page)
    })?;
    Ok(Json(result))
}

pub async fn create_supplier_invoice(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Json(body): Json<CreateSupplierInvoiceRequest>,
) -> AppResult<(StatusCode, Json<SupplierInvoice>)> {
    let total = to_cents(body.total);
    if total <= Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount.into());
    }

    let invoice = store.transaction(|ledger| {
        ledger.suppliers.require(&body.supplier_id)?;

        // The same supplier must not register the same document twice.
        let duplicate = ledger
            .supplier_invoices
            .iter()
            .any(|inv| inv.supplier_id == body.supplier_id && inv.number == body.number);
        if duplicate {
            return Err(EntityError::Duplicate {
                entity_type: "supplier invoice",
                field: "number",
                value: body.number.clone(),
            }
            .into());
        }

        let mut invoice = SupplierInvoice::new(
            body.number.clone(),
            body.supplier_id,
            total,
            body.issue_date,
            body.due_date,
        );
        invoice.notes = body.notes.clone();
        Ok(ledger.supplier_invoices.insert(invoice))
    })?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

pub async fn get_supplier_invoice(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<SupplierInvoice>> {
    let id = parse_id(&id)?;
    let invoice = store.read(|ledger| ledger.supplier_invoices.require(&id).cloned())??;
    Ok(Json(invoice))
}

pub async fn update_supplier_invoice(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateSupplierInvoiceRequest>,
) -> AppResult<Json<SupplierInvoice>> {
    let id = parse_id(&id)?;
    let invoice = store.transaction(|ledger| {
        let invoice = ledger.supplier_invoices.require_mut(&id)?;
        if let Some(due_date) = body.due_date {
            invoice.due_date = due_date;
        }
        if let Some(notes) = &body.notes {
            invoice.notes = Some(notes.clone());
        }
        invoice.touch();
        Ok(invoice.clone())
    })?;
    Ok(Json(invoice))
}

pub async fn supplier_invoice_stats(
    Tenant(store): Tenant,
    _user: CurrentUser,
) -> AppResult<Json<SupplierInvoiceStats>> {
    let now = Utc::now();
    let stats = store.read(|ledger| {
        let open: Vec<_> = ledger
            .supplier_invoices
            .iter()
            .filter(|inv| inv.is_payable())
            .collect();
        let overdue: Vec<_> = open.iter().filter(|inv| inv.is_overdue(now)).collect();
        SupplierInvoiceStats {
            pending_total: open.iter().map(|inv| inv.balance).sum(),
            overdue_total: overdue.iter().map(|inv| inv.balance).sum(),
            pending_count: open.len(),
            overdue_count: overdue.len(),
        }
    })?;
    Ok(Json(stats))
}
