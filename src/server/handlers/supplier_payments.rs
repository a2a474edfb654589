//! Supplier payment endpoints
//!
//! - POST /api/v1/suppliers/payments - Pay a supplier (FPAG code)
//! - GET /api/v1/suppliers/payments - Payment history
//! - GET /api/v1/suppliers/payments/{id} - One payment with allocations
//! - DELETE /api/v1/suppliers/payments/{id} - Reverse a payment

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::core::error::AppResult;
use crate::core::pagination::{PageQuery, Paginated};
use crate::payables::service::{
    PayablesService, SupplierPaymentFilter, SupplierPaymentRequest, SupplierPaymentView,
};
use crate::server::extract::{CurrentUser, Tenant};
use crate::server::handlers::parse_id;

#[derive(Debug, Deserialize)]
pub struct SupplierPaymentParams {
    pub supplier_id: Option<Uuid>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

pub async fn create_supplier_payment(
    Tenant(store): Tenant,
    CurrentUser(auth): CurrentUser,
    Json(body): Json<SupplierPaymentRequest>,
) -> AppResult<(StatusCode, Json<SupplierPaymentView>)> {
    let view = PayablesService::new(store).create_payment(&body, auth.user_id(), Utc::now())?;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn list_supplier_payments(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(params): Query<SupplierPaymentParams>,
) -> AppResult<Json<Paginated<SupplierPaymentView>>> {
    let filter = SupplierPaymentFilter {
        supplier_id: params.supplier_id,
        start_date: params.start_date,
        end_date: params.end_date,
    };
    let result = PayablesService::new(store).payments(&filter, page)?;
    Ok(Json(result))
}

pub async fn get_supplier_payment(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<SupplierPaymentView>> {
    let id = parse_id(&id)?;
    let view = PayablesService::new(store).payment(id)?;
    Ok(Json(view))
}

pub async fn reverse_supplier_payment(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    PayablesService::new(store).reverse_payment(id, Utc::now())?;
    Ok(StatusCode::NO_CONTENT)
}
