//! Domain records for the business-management schema
//!
//! Conventional ERP entities: clients and their receivable invoices and
//! payments, suppliers with payable invoices, purchases and payments,
//! products with categories and stock, and cash registers. Status
//! derivation for invoices (balance-driven PARTIAL/PAID/OVERDUE) lives on
//! the records themselves; the allocation rules live in `receivables` and
//! `payables`.

pub mod cash;
pub mod category;
pub mod client;
pub mod invoice;
pub mod payment;
pub mod product;
pub mod purchase;
pub mod stock;
pub mod supplier;
pub mod supplier_invoice;
pub mod supplier_payment;

pub use cash::{CashMovement, CashMovementType, CashRegister, CashRegisterStatus};
pub use category::Category;
pub use client::Client;
pub use invoice::{Invoice, InvoiceStatus, PaymentTerms};
pub use payment::{Payment, PaymentMethod};
pub use product::Product;
pub use purchase::{Purchase, PurchaseItem};
pub use stock::{MovementType, StockLevel, StockMovement};
pub use supplier::Supplier;
pub use supplier_invoice::{PayableStatus, SupplierInvoice};
pub use supplier_payment::{AllocationTarget, PaymentAllocation, SupplierPayment};
