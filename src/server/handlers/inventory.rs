//! Inventory: products, categories, stock and movements
//!
//! - GET/POST /api/v1/products (+ /{id} GET/PUT/DELETE)
//! - GET/POST /api/v1/categories (+ /{id} PUT/DELETE)
//! - GET /api/v1/inventory/stock - Stock levels joined with products
//! - POST /api/v1/inventory/adjustments - Manual stock adjustment
//! - GET /api/v1/inventory/alerts - Products at or below minimum stock
//! - GET /api/v1/inventory/movements - Movement history

use axum::Json;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::core::entity::Record;
use crate::core::error::{AppResult, EntityError, ValidationError};
use crate::core::money::to_cents;
use crate::core::pagination::{PageQuery, Paginated};
use crate::domain::{Category, MovementType, Product, StockLevel, StockMovement};
use crate::server::extract::{CurrentUser, Tenant};
use crate::server::handlers::parse_id;
use crate::storage::Ledger;

// =============================================================================
// Products
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ProductFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub cost: Decimal,
    pub price: Decimal,
    pub tax_rate: Option<Decimal>,
    pub min_stock: Option<i64>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub cost: Option<Decimal>,
    pub price: Option<Decimal>,
    pub tax_rate: Option<Decimal>,
    pub min_stock: Option<i64>,
    pub active: Option<bool>,
}

pub async fn list_products(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<ProductFilter>,
) -> AppResult<Json<Paginated<Product>>> {
    let result = store.read(|ledger| {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut rows: Vec<Product> = ledger
            .products
            .iter()
            .filter(|p| filter.active.is_none_or(|a| p.active == a))
            .filter(|p| filter.category_id.is_none_or(|id| p.category_id == Some(id)))
            .filter(|p| {
                search.as_deref().is_none_or(|needle| {
                    p.name.to_lowercase().contains(needle)
                        || p.code.to_lowercase().contains(needle)
                })
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.code.cmp(&b.code));
        Paginated::slice(rows, page)
    })?;
    Ok(Json(result))
}

pub async fn create_product(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Json(body): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<Product>)> {
    body.validate()?;

    let product = store.transaction(|ledger| {
        if ledger.products.find(|p| p.code == body.code).is_some() {
            return Err(EntityError::Duplicate {
                entity_type: "product",
                field: "code",
                value: body.code.clone(),
            }
            .into());
        }
        if let Some(category_id) = body.category_id {
            ledger.categories.require(&category_id)?;
        }

        let mut product = Product::new(
            body.code.clone(),
            body.name.clone(),
            to_cents(body.cost),
            to_cents(body.price),
        );
        product.description = body.description.clone();
        product.category_id = body.category_id;
        if let Some(tax_rate) = body.tax_rate {
            product.tax_rate = tax_rate;
        }
        if let Some(min_stock) = body.min_stock {
            product.min_stock = min_stock;
        }
        Ok(ledger.products.insert(product))
    })?;

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn get_product(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let id = parse_id(&id)?;
    let product = store.read(|ledger| ledger.products.require(&id).cloned())??;
    Ok(Json(product))
}

pub async fn update_product(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateProductRequest>,
) -> AppResult<Json<Product>> {
    let id = parse_id(&id)?;
    body.validate()?;

    let product = store.transaction(|ledger| {
        if let Some(category_id) = body.category_id {
            ledger.categories.require(&category_id)?;
        }
        let product = ledger.products.require_mut(&id)?;
        if let Some(name) = &body.name {
            product.name = name.clone();
        }
        if let Some(description) = &body.description {
            product.description = Some(description.clone());
        }
        if body.category_id.is_some() {
            product.category_id = body.category_id;
        }
        if let Some(cost) = body.cost {
            product.cost = to_cents(cost);
        }
        if let Some(price) = body.price {
            product.price = to_cents(price);
        }
        if let Some(tax_rate) = body.tax_rate {
            product.tax_rate = tax_rate;
        }
        if let Some(min_stock) = body.min_stock {
            product.min_stock = min_stock;
        }
        if let Some(active) = body.active {
            product.active = active;
        }
        product.touch();
        Ok(product.clone())
    })?;

    Ok(Json(product))
}

pub async fn delete_product(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    store.transaction(|ledger| {
        let in_stock = ledger
            .stock_levels
            .iter()
            .any(|s| s.product_id == id && s.quantity > 0);
        if in_stock {
            return Err(EntityError::DeleteBlocked {
                entity_type: "product",
                id,
                reason: "product still has stock on hand".to_string(),
            }
            .into());
        }
        let product = ledger.products.require_mut(&id)?;
        product.deleted_at = Some(Utc::now());
        product.touch();
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CategoryRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub description: Option<String>,
}

pub async fn list_categories(
    Tenant(store): Tenant,
    _user: CurrentUser,
) -> AppResult<Json<Vec<Category>>> {
    let mut rows = store.read(|ledger| ledger.categories.filter(|_| true))?;
    rows.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(rows))
}

pub async fn create_category(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Json(body): Json<CategoryRequest>,
) -> AppResult<(StatusCode, Json<Category>)> {
    body.validate()?;
    let category = store.transaction(|ledger| {
        if ledger.categories.find(|c| c.name == body.name).is_some() {
            return Err(EntityError::Duplicate {
                entity_type: "category",
                field: "name",
                value: body.name.clone(),
            }
            .into());
        }
        Ok(ledger
            .categories
            .insert(Category::new(body.name.clone(), body.description.clone())))
    })?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<CategoryRequest>,
) -> AppResult<Json<Category>> {
    let id = parse_id(&id)?;
    body.validate()?;
    let category = store.transaction(|ledger| {
        let category = ledger.categories.require_mut(&id)?;
        category.name = body.name.clone();
        category.description = body.description.clone();
        category.touch();
        Ok(category.clone())
    })?;
    Ok(Json(category))
}

pub async fn delete_category(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let id = parse_id(&id)?;
    store.transaction(|ledger| {
        let referenced = ledger.products.iter().any(|p| p.category_id == Some(id));
        if referenced {
            return Err(EntityError::DeleteBlocked {
                entity_type: "category",
                id,
                reason: "products still reference this category".to_string(),
            }
            .into());
        }
        let category = ledger.categories.require_mut(&id)?;
        category.deleted_at = Some(Utc::now());
        category.touch();
        Ok(())
    })?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Stock
// =============================================================================

#[derive(Debug, Serialize)]
pub struct StockRow {
    pub product_id: Uuid,
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub min_stock: i64,
    pub below_minimum: bool,
}

#[derive(Debug, Deserialize)]
pub struct AdjustmentRequest {
    pub product_id: Uuid,
    /// Signed quantity change
    pub quantity: i64,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MovementFilter {
    pub product_id: Option<Uuid>,
}

fn stock_rows(ledger: &Ledger) -> Vec<StockRow> {
    let mut rows: Vec<StockRow> = ledger
        .products
        .iter()
        .filter(|p| p.active)
        .map(|p| {
            let quantity = ledger
                .stock_levels
                .find(|s| s.product_id == p.id)
                .map(|s| s.quantity)
                .unwrap_or(0);
            StockRow {
                product_id: p.id,
                code: p.code.clone(),
                name: p.name.clone(),
                quantity,
                min_stock: p.min_stock,
                below_minimum: quantity <= p.min_stock,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.code.cmp(&b.code));
    rows
}

pub async fn stock_view(
    Tenant(store): Tenant,
    _user: CurrentUser,
) -> AppResult<Json<Vec<StockRow>>> {
    let rows = store.read(|ledger| stock_rows(ledger))?;
    Ok(Json(rows))
}

pub async fn low_stock_alerts(
    Tenant(store): Tenant,
    _user: CurrentUser,
) -> AppResult<Json<Vec<StockRow>>> {
    let rows = store.read(|ledger| {
        stock_rows(ledger)
            .into_iter()
            .filter(|r| r.below_minimum)
            .collect::<Vec<_>>()
    })?;
    Ok(Json(rows))
}

pub async fn adjust_stock(
    Tenant(store): Tenant,
    CurrentUser(auth): CurrentUser,
    Json(body): Json<AdjustmentRequest>,
) -> AppResult<(StatusCode, Json<StockMovement>)> {
    if body.quantity == 0 {
        return Err(ValidationError::field("quantity", "must not be zero").into());
    }
    let user_id = auth.user_id();

    let movement = store.transaction(|ledger| {
        ledger.products.require(&body.product_id)?;

        let current = ledger
            .stock_levels
            .find(|s| s.product_id == body.product_id);
        let new_quantity = current.as_ref().map(|s| s.quantity).unwrap_or(0) + body.quantity;
        if new_quantity < 0 {
            return Err(
                ValidationError::field("quantity", "adjustment would leave negative stock").into(),
            );
        }
        match current {
            Some(mut level) => {
                level.quantity = new_quantity;
                level.touch();
                ledger.stock_levels.insert(level);
            }
            None => {
                ledger
                    .stock_levels
                    .insert(StockLevel::new(body.product_id, new_quantity));
            }
        }

        Ok(ledger.stock_movements.insert(StockMovement::new(
            body.product_id,
            MovementType::Adjustment,
            body.quantity,
            body.reason.clone(),
            user_id,
        )))
    })?;

    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn list_movements(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
    Query(filter): Query<MovementFilter>,
) -> AppResult<Json<Paginated<StockMovement>>> {
    let result = store.read(|ledger| {
        let mut rows: Vec<StockMovement> = ledger
            .stock_movements
            .iter()
            .filter(|m| filter.product_id.is_none_or(|id| m.product_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.movement_date.cmp(&a.movement_date));
        Paginated::slice(rows, page)
    })?;
    Ok(Json(result))
}
