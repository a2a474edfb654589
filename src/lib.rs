//! # Comercio
//!
//! Multi-tenant business management REST API: clients, inventory,
//! accounts receivable and accounts payable.
//!
//! The heart of the crate is the reconciliation engine: a single payment
//! is allocated across a client's outstanding invoices either manually
//! (explicit per-invoice amounts that must sum to the payment) or
//! proportionally to each invoice's balance, with cent-exact largest
//! remainder rounding. Payables mirror the same mechanics for supplier
//! invoices and purchases.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use comercio::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AppConfig::from_yaml_file("config.yaml")?;
//!     comercio::server::serve(&config).await
//! }
//! ```
//!
//! Every request carries a tenant (`x-tenant-subdomain` header or Host
//! subdomain); each tenant gets an isolated in-memory ledger.

pub mod config;
pub mod core;
pub mod domain;
pub mod payables;
pub mod receivables;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthContext, AuthProvider, NoAuthProvider, StaticToken, StaticTokenProvider},
        entity::Record,
        error::{AppError, AppResult},
        pagination::{PageQuery, Paginated},
        tenant::{TENANT_HEADER, TenantId},
    };

    // === Domain ===
    pub use crate::domain::{
        CashMovement, CashRegister, Category, Client, Invoice, InvoiceStatus, Payment,
        PaymentMethod, PaymentTerms, Product, Purchase, StockLevel, StockMovement, Supplier,
        SupplierInvoice, SupplierPayment,
    };

    // === Services ===
    pub use crate::payables::PayablesService;
    pub use crate::receivables::{AgeBucket, Distribution, ReceivablesService, allocate};

    // === Storage ===
    pub use crate::storage::{Ledger, TenantRegistry, TenantStore};

    // === Server ===
    pub use crate::server::{AppState, build_router, serve};

    // === Config ===
    pub use crate::config::AppConfig;

    // === External dependencies ===
    pub use anyhow::Result;
    pub use chrono::{DateTime, Utc};
    pub use rust_decimal::Decimal;
    pub use uuid::Uuid;
}
