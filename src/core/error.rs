//! Typed error handling for the comercio backend
//!
//! Every failure surfaces as an [`AppError`], which maps to an HTTP status
//! code and a stable error code, and renders as the JSON body the frontend
//! expects: `{ "error": { "code", "message", "details"? } }`.
//!
//! # Error Categories
//!
//! - [`EntityError`]: missing or conflicting domain records
//! - [`ValidationError`]: malformed or rejected input
//! - [`PaymentError`]: reconciliation and allocation rule violations
//! - [`TenantError`]: tenant resolution failures
//! - [`RequestError`]: HTTP-level problems (auth, headers, ids)
//! - [`StorageError`]: store-level failures

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

/// The main error type for the backend
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Entity(#[from] EntityError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error(transparent)]
    Tenant(#[from] TenantError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Internal errors that should not happen in normal operation
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error body serialized inside the top-level `error` key
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Stable code for programmatic handling
    pub code: String,
    /// Human-readable message
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Top-level error response envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Entity(e) => e.status_code(),
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Payment(e) => e.status_code(),
            AppError::Tenant(e) => e.status_code(),
            AppError::Request(e) => e.status_code(),
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the stable error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Entity(e) => e.error_code(),
            AppError::Validation(e) => e.error_code(),
            AppError::Payment(e) => e.error_code(),
            AppError::Tenant(e) => e.error_code(),
            AppError::Request(e) => e.error_code(),
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to the JSON response envelope
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: ErrorBody {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details: self.details(),
            },
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string(),
                }))
            }
            AppError::Validation(ValidationError::FieldErrors(errors)) => {
                Some(serde_json::json!({ "fields": errors }))
            }
            AppError::Payment(PaymentError::AllocationExceedsBalance {
                invoice_number,
                allocated,
                balance,
            }) => Some(serde_json::json!({
                "invoice": invoice_number,
                "allocated": allocated.to_string(),
                "balance": balance.to_string(),
            })),
            AppError::Payment(PaymentError::AmountMismatch { expected, allocated }) => {
                Some(serde_json::json!({
                    "expected": expected.to_string(),
                    "allocated": allocated.to_string(),
                }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to domain records
#[derive(Debug, Error)]
pub enum EntityError {
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: &'static str, id: Uuid },

    #[error("{entity_type} with {field} '{value}' already exists")]
    Duplicate {
        entity_type: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("{entity_type} '{id}' cannot be deleted: {reason}")]
    DeleteBlocked {
        entity_type: &'static str,
        id: Uuid,
        reason: String,
    },

    #[error("{entity_type} '{id}' is in state {state} and does not allow {operation}")]
    InvalidState {
        entity_type: &'static str,
        id: Uuid,
        state: String,
        operation: &'static str,
    },
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::Duplicate { .. } => StatusCode::CONFLICT,
            EntityError::DeleteBlocked { .. } => StatusCode::CONFLICT,
            EntityError::InvalidState { .. } => StatusCode::CONFLICT,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "NOT_FOUND",
            EntityError::Duplicate { .. } => "ALREADY_EXISTS",
            EntityError::DeleteBlocked { .. } => "DELETE_BLOCKED",
            EntityError::InvalidState { .. } => "INVALID_STATE",
        }
    }

    pub fn not_found(entity_type: &'static str, id: Uuid) -> Self {
        EntityError::NotFound { entity_type, id }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// A single field validation error
#[derive(Debug, Clone, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

/// Errors related to input validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Validation error for field '{field}': {message}")]
    Field { field: String, message: String },

    #[error("Invalid input")]
    FieldErrors(Vec<FieldIssue>),

    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid UUID format: {value}")]
    InvalidUuid { value: String },
}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::Field { .. } => "VALIDATION_ERROR",
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
            ValidationError::MissingField { .. } => "VALIDATION_ERROR",
            ValidationError::InvalidUuid { .. } => "INVALID_UUID",
        }
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Field {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Payment / Reconciliation Errors
// =============================================================================

/// Errors raised by the receivables/payables reconciliation rules
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Payment amount must be positive")]
    NonPositiveAmount,

    #[error("Some invoices are invalid or do not belong to the client")]
    InvalidInvoices,

    #[error("Payment amount exceeds total outstanding balance")]
    AmountExceedsTotal,

    #[error("Payment amount for invoice {invoice_number} exceeds its balance")]
    AllocationExceedsBalance {
        invoice_number: String,
        allocated: Decimal,
        balance: Decimal,
    },

    #[error("Total payment amount does not match sum of invoice allocations")]
    AmountMismatch { expected: Decimal, allocated: Decimal },

    #[error("No outstanding invoices to apply the payment to")]
    NothingOutstanding,

    #[error("No open cash register for cash payments")]
    NoCashRegisterOpen,
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentError::NonPositiveAmount => "VALIDATION_ERROR",
            PaymentError::InvalidInvoices => "INVALID_INVOICES",
            PaymentError::AmountExceedsTotal => "AMOUNT_EXCEEDS_BALANCE",
            PaymentError::AllocationExceedsBalance { .. } => "AMOUNT_EXCEEDS_BALANCE",
            PaymentError::AmountMismatch { .. } => "AMOUNT_MISMATCH",
            PaymentError::NothingOutstanding => "NOTHING_OUTSTANDING",
            PaymentError::NoCashRegisterOpen => "CASH_REGISTER_CLOSED",
        }
    }
}

// =============================================================================
// Tenant Errors
// =============================================================================

/// Errors related to tenant resolution
#[derive(Debug, Error)]
pub enum TenantError {
    #[error("Tenant could not be resolved from the request")]
    Missing,

    #[error("Unknown tenant: {subdomain}")]
    Unknown { subdomain: String },

    #[error("Invalid tenant subdomain: {subdomain}")]
    InvalidSubdomain { subdomain: String },
}

impl TenantError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TenantError::Missing => StatusCode::BAD_REQUEST,
            TenantError::Unknown { .. } => StatusCode::NOT_FOUND,
            TenantError::InvalidSubdomain { .. } => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            TenantError::Missing => "TENANT_MISSING",
            TenantError::Unknown { .. } => "TENANT_NOT_FOUND",
            TenantError::InvalidSubdomain { .. } => "TENANT_INVALID",
        }
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid entity ID format: '{id}'")]
    InvalidEntityId { id: String },

    #[error("Invalid request body: {message}")]
    InvalidBody { message: String },

    #[error("Missing required header: {header}")]
    MissingHeader { header: &'static str },

    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },
}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidEntityId { .. } => StatusCode::BAD_REQUEST,
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::MissingHeader { .. } => StatusCode::BAD_REQUEST,
            RequestError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            RequestError::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidEntityId { .. } => "INVALID_ENTITY_ID",
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::MissingHeader { .. } => "MISSING_HEADER",
            RequestError::Unauthorized { .. } => "UNAUTHORIZED",
            RequestError::Forbidden { .. } => "FORBIDDEN",
        }
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to the backing store
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to acquire store lock: {message}")]
    LockPoisoned { message: String },

    #[error("Transaction aborted: {message}")]
    TransactionAborted { message: String },
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<uuid::Error> for AppError {
    fn from(err: uuid::Error) -> Self {
        AppError::Validation(ValidationError::InvalidUuid {
            value: err.to_string(),
        })
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errs: validator::ValidationErrors) -> Self {
        let issues = errs
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| FieldIssue {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        AppError::Validation(ValidationError::FieldErrors(issues))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// A specialized Result type for backend operations
pub type AppResult<T> = Result<T, AppError>;
