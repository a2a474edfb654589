//! Cash registers and movements
//!
//! At most one register is OPEN per tenant at any time. Cash receivable
//! payments require an open register and record a movement against it;
//! closing compares the counted amount with the expected one.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::entity::Record;
use crate::domain::payment::PaymentMethod;
use crate::impl_record;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashRegisterStatus {
    Open,
    Closed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashMovementType {
    Income,
    Expense,
    Payment,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CashRegister {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    pub opened_by: Uuid,
    pub opened_at: DateTime<Utc>,
    pub opening_amount: Decimal,
    pub status: CashRegisterStatus,
    pub closed_at: Option<DateTime<Utc>>,
    /// Amount counted at close
    pub closing_amount: Option<Decimal>,
    /// Opening amount plus net cash movements at close
    pub expected_amount: Option<Decimal>,
    /// `closing_amount - expected_amount`
    pub difference: Option<Decimal>,
}

impl_record!(CashRegister, "cash register");

impl CashRegister {
    pub fn open(opened_by: Uuid, opening_amount: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            opened_by,
            opened_at: now,
            opening_amount,
            status: CashRegisterStatus::Open,
            closed_at: None,
            closing_amount: None,
            expected_amount: None,
            difference: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == CashRegisterStatus::Open
    }

    /// Close the register against the counted amount.
    pub fn close(&mut self, counted: Decimal, expected: Decimal, now: DateTime<Utc>) {
        self.status = CashRegisterStatus::Closed;
        self.closed_at = Some(now);
        self.closing_amount = Some(counted);
        self.expected_amount = Some(expected);
        self.difference = Some(counted - expected);
        self.touch();
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CashMovement {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,

    pub cash_register_id: Uuid,
    pub movement_type: CashMovementType,
    pub concept: String,
    pub amount: Decimal,
    pub method: PaymentMethod,
    /// Receivable payment that generated this movement, if any
    pub payment_id: Option<Uuid>,
    pub user_id: Uuid,
    pub movement_date: DateTime<Utc>,
}

impl_record!(CashMovement, "cash movement");

impl CashMovement {
    pub fn new(
        cash_register_id: Uuid,
        movement_type: CashMovementType,
        concept: String,
        amount: Decimal,
        user_id: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
            cash_register_id,
            movement_type,
            concept,
            amount,
            method: PaymentMethod::Cash,
            payment_id: None,
            user_id,
            movement_date: now,
        }
    }

    /// Signed effect of this movement on the drawer.
    pub fn signed_amount(&self) -> Decimal {
        match self.movement_type {
            CashMovementType::Income | CashMovementType::Payment => self.amount,
            CashMovementType::Expense => -self.amount,
        }
    }
}
