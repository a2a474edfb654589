//! Cash register endpoints
//!
//! - POST /api/v1/cash/open - Open the register (one OPEN per tenant)
//! - POST /api/v1/cash/close - Close against the counted amount
//! - GET /api/v1/cash/current - The open register, if any
//! - GET /api/v1/cash/movements - Movements of the open register
//! - POST /api/v1/cash/movements - Manual income/expense
//! - GET /api/v1/cash/summary - Daily totals per movement type

use axum::Json;
use axum::extract::Query;
use axum::http::StatusCode;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::error::{AppError, AppResult, EntityError, PaymentError, ValidationError};
use crate::core::money::to_cents;
use crate::core::pagination::{PageQuery, Paginated};
use crate::domain::{CashMovement, CashMovementType, CashRegister};
use crate::server::extract::{CurrentUser, Tenant};
use crate::storage::Ledger;

#[derive(Debug, Deserialize)]
pub struct OpenRegisterRequest {
    pub opening_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct CloseRegisterRequest {
    /// Cash counted in the drawer
    pub closing_amount: Decimal,
}

#[derive(Debug, Deserialize)]
pub struct ManualMovementRequest {
    pub movement_type: CashMovementType,
    pub concept: String,
    pub amount: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CashSummary {
    pub register: CashRegister,
    pub income: Decimal,
    pub expense: Decimal,
    pub payments: Decimal,
    pub expected_amount: Decimal,
    pub movement_count: usize,
}

/// Opening balance plus the net effect of this register's movements.
fn expected_amount(ledger: &Ledger, register: &CashRegister) -> Decimal {
    register.opening_amount
        + ledger
            .cash_movements
            .iter()
            .filter(|m| m.cash_register_id == register.id)
            .map(|m| m.signed_amount())
            .sum::<Decimal>()
}

pub async fn open_register(
    Tenant(store): Tenant,
    CurrentUser(auth): CurrentUser,
    Json(body): Json<OpenRegisterRequest>,
) -> AppResult<(StatusCode, Json<CashRegister>)> {
    let opening = to_cents(body.opening_amount);
    if opening < Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount.into());
    }
    let user_id = auth.user_id();

    let register = store.transaction(|ledger| {
        if let Some(open) = ledger.open_cash_register() {
            return Err(EntityError::InvalidState {
                entity_type: "cash register",
                id: open.id,
                state: "OPEN".to_string(),
                operation: "open",
            }
            .into());
        }
        Ok(ledger
            .cash_registers
            .insert(CashRegister::open(user_id, opening)))
    })?;

    Ok((StatusCode::CREATED, Json(register)))
}

pub async fn close_register(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Json(body): Json<CloseRegisterRequest>,
) -> AppResult<Json<CashRegister>> {
    let counted = to_cents(body.closing_amount);
    let now = Utc::now();

    let register = store.transaction(|ledger| {
        let open = ledger
            .open_cash_register()
            .ok_or(PaymentError::NoCashRegisterOpen)?;
        let expected = expected_amount(ledger, &open);

        let register = ledger.cash_registers.require_mut(&open.id)?;
        register.close(counted, expected, now);
        Ok(register.clone())
    })?;

    Ok(Json(register))
}

pub async fn current_register(
    Tenant(store): Tenant,
    _user: CurrentUser,
) -> AppResult<Json<Option<CashRegister>>> {
    let register = store.read(|ledger| ledger.open_cash_register())?;
    Ok(Json(register))
}

pub async fn list_movements(
    Tenant(store): Tenant,
    _user: CurrentUser,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Paginated<CashMovement>>> {
    let result = store.read(|ledger| {
        let register = ledger
            .open_cash_register()
            .ok_or(PaymentError::NoCashRegisterOpen)?;
        let mut rows: Vec<CashMovement> = ledger
            .cash_movements
            .filter(|m| m.cash_register_id == register.id);
        rows.sort_by(|a, b| b.movement_date.cmp(&a.movement_date));
        Ok::<_, AppError>(Paginated::slice(rows, page))
    })??;
    Ok(Json(result))
}

pub async fn create_movement(
    Tenant(store): Tenant,
    CurrentUser(auth): CurrentUser,
    Json(body): Json<ManualMovementRequest>,
) -> AppResult<(StatusCode, Json<CashMovement>)> {
    let amount = to_cents(body.amount);
    if amount <= Decimal::ZERO {
        return Err(PaymentError::NonPositiveAmount.into());
    }
    if body.concept.trim().is_empty() {
        return Err(ValidationError::field("concept", "must not be empty").into());
    }
    // Payment movements only come from the receivables flow.
    if body.movement_type == CashMovementType::Payment {
        return Err(
            ValidationError::field("movement_type", "expected INCOME or EXPENSE").into(),
        );
    }
    let user_id = auth.user_id();

    let movement = store.transaction(|ledger| {
        let register = ledger
            .open_cash_register()
            .ok_or(PaymentError::NoCashRegisterOpen)?;
        Ok(ledger.cash_movements.insert(CashMovement::new(
            register.id,
            body.movement_type,
            body.concept.clone(),
            amount,
            user_id,
        )))
    })?;

    Ok((StatusCode::CREATED, Json(movement)))
}

pub async fn daily_summary(
    Tenant(store): Tenant,
    _user: CurrentUser,
) -> AppResult<Json<CashSummary>> {
    let summary = store.read(|ledger| {
        let register = ledger
            .open_cash_register()
            .ok_or(PaymentError::NoCashRegisterOpen)?;
        let movements: Vec<CashMovement> = ledger
            .cash_movements
            .filter(|m| m.cash_register_id == register.id);

        let total_of = |kind: CashMovementType| -> Decimal {
            movements
                .iter()
                .filter(|m| m.movement_type == kind)
                .map(|m| m.amount)
                .sum()
        };

        Ok::<_, AppError>(CashSummary {
            income: total_of(CashMovementType::Income),
            expense: total_of(CashMovementType::Expense),
            payments: total_of(CashMovementType::Payment),
            expected_amount: expected_amount(ledger, &register),
            movement_count: movements.len(),
            register,
        })
    })??;
    Ok(Json(summary))
}
