//! Supplier CRUD and stats
//!
//! - GET /api/v1/suppliers - List suppliers (search, active filter)
//! - POST /api/v1/suppliers - Create a supplier
//! - GET /api/v1/suppliers/{id} - Get a supplier
//! - PUT /api/v1/suppliers/{id} - Update a supplier
//! - DELETE /api/v1/suppliers/{id} - Soft-delete (blocked while payables exist)
//! - GET /api/v1/suppliers/{id}/status - Outstanding documents
//! - GET /api/v1/suppliers/stats - Global payables rollup

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::core::entity::Record;
use crate::core::error::{AppResult, EntityError};
use crate::core::pagination::{PageQuery, Paginated};
use crate::domain::Supplier;
use crate::payables::service::{PayablesService, PayablesSummary, SupplierStatus};
use crate::server::extract::{CurrentUser, Tenant};
use crate::server::handlers::parse_id;
use crate::storage::Ledger;

#[derive(Debug, Deserialize)]
pub struct SupplierFilter {
    pub search: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    /// Assigned sequentially when omitted
    pub code: Option<String>,
    pub rnc: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSupplierRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub rnc: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub contact_name: Option<String>,
    pub active: Option<bool>,
}

pub async fn list_suppliers(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<SupplierFilter>,
) -> AppResult<Json<Paginated<Supplier>>> {
    let result = store.read(|ledger| {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut rows: Vec<Supplier> = ledger
            .suppliers
            .iter()
            .filter(|s| filter.active.is_none_or(|a| s.active == a))
            .filter(|s| {
                search.as_deref().is_none_or(|needle| {
                    s.name.to_lowercase().contains(needle)
                        || s.code.to_lowercase().contains(needle)
                        || s.rnc
                            .as_deref()
                            .is_some_and(|r| r.to_lowercase().contains(needle))
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Paginated::slice(rows, page)
    })?;
    Ok(Json(result))
}

pub async fn create_supplier(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Json(body): Json<CreateSupplierRequest>,
) -> AppResult<(StatusCode, Json<Supplier>)> {
    body.validate()?;

    let supplier = store.transaction(|ledger| {
        let code = match &body.code {
            Some(code) => {
                if ledger.suppliers.find(|s| s.code == *code).is_some() {
                    return Err(EntityError::Duplicate {
                        entity_type: "supplier",
                        field: "code",
                        value: code.clone(),
                    }
                    .into());
                }
                code.clone()
            }
            None => next_supplier_code(ledger),
        };

        let mut supplier = Supplier::new(code, body.name.clone());
        supplier.rnc = body.rnc.clone();
        supplier.email = body.email.clone();
        supplier.phone = body.phone.clone();
        supplier.address = body.address.clone();
        supplier.contact_name = body.contact_name.clone();
        Ok(ledger.suppliers.insert(supplier))
    })?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

pub async fn get_supplier(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Supplier>> {
    let id = parse_id(&id)?;
    let supplier = store.read(|ledger| ledger.suppliers.require(&id).cloned())??;
    Ok(Json(supplier))
}

pub async fn update_supplier(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateSupplierRequest>,
) -> AppResult<Json<Supplier>> {
    let id = parse_id(&id)?;
    body.validate()?;

    let supplier = store.transaction(|ledger| {
        let supplier = ledger.suppliers.require_mut(&id)?;
        if let Some(name) = &body.name {
            supplier.name = name.clone();
        }
        if let Some(rnc) = &body.rnc {
            supplier.rnc = Some(rnc.clone());
        }
        if let Some(email) = &body.email {
            supplier.email = Some(email.clone());
        }
        if let Some(phone) = &body.phone {
            supplier.phone = Some(phone.clone());
        }
        if let Some(address) = &body.address {
            supplier.address = Some(address.clone());
        }
        if let Some(contact_name) = &body.contact_name {
            supplier.contact_name = Some(contact_name.clone());
        }
        if let Some(active) = body.active {
            supplier.active = active;
        }
        supplier.touch();
        Ok(supplier.clone())
    })?;

    Ok(Json(supplier))
}

pub async fn delete_supplier(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    store.transaction(|ledger| {
        let owed = ledger
            .supplier_invoices
            .iter()
            .any(|inv| inv.supplier_id == id && inv.balance > Decimal::ZERO)
            || ledger
                .purchases
                .iter()
                .any(|p| p.supplier_id == id && p.balance > Decimal::ZERO);
        if owed {
            return Err(EntityError::DeleteBlocked {
                entity_type: "supplier",
                id,
                reason: "supplier has outstanding payables".to_string(),
            }
            .into());
        }
        let supplier = ledger.suppliers.require_mut(&id)?;
        supplier.deleted_at = Some(Utc::now());
        supplier.touch();
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn supplier_status(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<SupplierStatus>> {
    let id = parse_id(&id)?;
    let status = PayablesService::new(store).supplier_status(id, Utc::now())?;
    Ok(Json(status))
}

pub async fn payables_stats(
    Tenant(store): Tenant,
    _user: CurrentUser,
) -> AppResult<Json<PayablesSummary>> {
    let summary = PayablesService::new(store).summary(Utc::now())?;
    Ok(Json(summary))
}

fn next_supplier_code(ledger: &Ledger) -> String {
    let next = ledger
        .suppliers
        .iter_all()
        .filter_map(|s| s.code.strip_prefix("PROV-"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0)
        + 1;
    format!("PROV-{next:06}")
}
