//! Accounts receivable endpoints
//!
//! - GET /api/v1/receivables/status/{client_id} - Account status
//! - GET /api/v1/receivables/overdue - Overdue invoices (aging filters)
//! - POST /api/v1/receivables/payments - Apply a payment
//! - GET /api/v1/receivables/payments - Payment history
//! - GET /api/v1/receivables/summary - Tenant-wide rollup

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::{AppResult, ValidationError};
use crate::core::pagination::{PageQuery, Paginated};
use crate::receivables::aging::AgeBucket;
use crate::receivables::service::{
    AccountStatus, OverdueEntry, OverdueFilter, PaymentFilter, PaymentReceipt, PaymentRequest,
    PaymentRow, ReceivablesService, ReceivablesSummary,
};
use crate::server::extract::{CurrentUser, Tenant};
use crate::server::handlers::parse_id;

#[derive(Debug, Deserialize)]
pub struct OverdueParams {
    /// Aging bucket label: 0-30, 31-60, 61-90 or 90+
    pub days: Option<String>,
    pub client_id: Option<Uuid>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentHistoryParams {
    pub client_id: Option<Uuid>,
    pub invoice_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

pub async fn account_status(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(client_id): Path<String>,
) -> AppResult<Json<AccountStatus>> {
    let client_id = parse_id(&client_id)?;
    let status = ReceivablesService::new(store).account_status(client_id, Utc::now())?;
    Ok(Json(status))
}

pub async fn overdue_invoices(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(params): Query<OverdueParams>,
) -> AppResult<Json<Paginated<OverdueEntry>>> {
    let bucket = match params.days.as_deref() {
        Some(label) => Some(AgeBucket::parse(label).ok_or_else(|| {
            ValidationError::field("days", "expected one of 0-30, 31-60, 61-90, 90+")
        })?),
        None => None,
    };
    let filter = OverdueFilter {
        bucket,
        client_id: params.client_id,
        search: params.search,
    };
    let result = ReceivablesService::new(store).overdue(&filter, page, Utc::now())?;
    Ok(Json(result))
}

pub async fn create_payment(
    Tenant(store): Tenant,
    CurrentUser(auth): CurrentUser,
    Json(body): Json<PaymentRequest>,
) -> AppResult<(StatusCode, Json<PaymentReceipt>)> {
    let receipt = ReceivablesService::new(store).create_payment(&body, auth.user_id(), Utc::now())?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

pub async fn payment_history(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(params): Query<PaymentHistoryParams>,
) -> AppResult<Json<Paginated<PaymentRow>>> {
    let filter = PaymentFilter {
        client_id: params.client_id,
        invoice_id: params.invoice_id,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let result = ReceivablesService::new(store).payments(&filter, page)?;
    Ok(Json(result))
}

pub async fn summary(
    Tenant(store): Tenant,
    _user: CurrentUser,
) -> AppResult<Json<ReceivablesSummary>> {
    let summary = ReceivablesService::new(store).summary(Utc::now())?;
    Ok(Json(summary))
}
