//! Purchases
//!
//! - GET /api/v1/purchases - List purchases (supplier/received filters)
//! - POST /api/v1/purchases - Register a purchase order
//! - GET /api/v1/purchases/{id} - Get one
//! - POST /api/v1/purchases/{id}/receive - Receive goods (stock in)

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::core::entity::Record;
use crate::core::error::{AppResult, EntityError, PaymentError, ValidationError};
use crate::core::money::to_cents;
use crate::core::pagination::{PageQuery, Paginated};
use crate::domain::{MovementType, Purchase, PurchaseItem, StockLevel, StockMovement};
use crate::server::extract::{CurrentUser, Tenant};
use crate::server::handlers::parse_id;
use crate::storage::Ledger;

#[derive(Debug, Deserialize)]
pub struct PurchaseFilter {
    pub supplier_id: Option<Uuid>,
    pub received: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseItemRequest {
    pub product_id: Uuid,
    pub quantity: i64,
    pub unit_cost: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequest {
    pub supplier_id: Uuid,
    pub items: Vec<PurchaseItemRequest>,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn list_purchases(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<PurchaseFilter>,
) -> AppResult<Json<Paginated<Purchase>>> {
    let result = store.read(|ledger| {
        let mut rows: Vec<Purchase> = ledger
            .purchases
            .iter()
            .filter(|p| filter.supplier_id.is_none_or(|id| p.supplier_id == id))
            .filter(|p| filter.received.is_none_or(|r| p.received == r))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Paginated::slice(rows, page)
    })?;
    Ok(Json(result))
}

pub async fn create_purchase(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Json(body): Json<CreatePurchaseRequest>,
) -> AppResult<(StatusCode, Json<Purchase>)> {
    if body.items.is_empty() {
        return Err(ValidationError::field("items", "at least one item is required").into());
    }

    let purchase = store.transaction(|ledger| {
        ledger.suppliers.require(&body.supplier_id)?;

        let mut items = Vec::with_capacity(body.items.len());
        for item in &body.items {
            ledger.products.require(&item.product_id)?;
            if item.quantity <= 0 {
                return Err(ValidationError::field("quantity", "must be positive").into());
            }
            let unit_cost = to_cents(item.unit_cost);
            if unit_cost < Decimal::ZERO {
                return Err(PaymentError::NonPositiveAmount.into());
            }
            items.push(PurchaseItem {
                product_id: item.product_id,
                quantity: item.quantity,
                unit_cost,
            });
        }

        let mut purchase = Purchase::new(next_purchase_code(ledger), body.supplier_id, items);
        purchase.notes = body.notes.clone();
        Ok(ledger.purchases.insert(purchase))
    })?;

    Ok((StatusCode::CREATED, Json(purchase)))
}

pub async fn get_purchase(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Purchase>> {
    let id = parse_id(&id)?;
    let purchase = store.read(|ledger| ledger.purchases.require(&id).cloned())??;
    Ok(Json(purchase))
}

/// Mark a purchase received and post the stock-in movements.
pub async fn receive_purchase(
    Tenant(store): Tenant,
    CurrentUser(auth): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Purchase>> {
    let id = parse_id(&id)?;
    let now = Utc::now();
    let user_id = auth.user_id();

    let purchase = store.transaction(|ledger| {
        let purchase = ledger.purchases.require(&id)?.clone();
        if purchase.received {
            return Err(EntityError::InvalidState {
                entity_type: "purchase",
                id,
                state: "RECEIVED".to_string(),
                operation: "receive",
            }
            .into());
        }

        for item in &purchase.items {
            match ledger.stock_levels.find(|s| s.product_id == item.product_id) {
                Some(mut level) => {
                    level.quantity += item.quantity;
                    level.touch();
                    ledger.stock_levels.insert(level);
                }
                None => {
                    ledger
                        .stock_levels
                        .insert(StockLevel::new(item.product_id, item.quantity));
                }
            }
            ledger.stock_movements.insert(StockMovement::new(
                item.product_id,
                MovementType::In,
                item.quantity,
                Some(format!("Purchase {} received", purchase.code)),
                user_id,
            ));
        }

        let purchase = ledger.purchases.require_mut(&id)?;
        purchase.mark_received(now);
        Ok(purchase.clone())
    })?;

    Ok(Json(purchase))
}

fn next_purchase_code(ledger: &Ledger) -> String {
    let next = ledger
        .purchases
        .iter_all()
        .map(|p| Purchase::code_sequence(&p.code))
        .max()
        .unwrap_or(0)
        + 1;
    Purchase::code_for(next)
}
