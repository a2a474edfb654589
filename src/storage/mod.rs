//! Storage backends
//!
//! Only the in-memory backend ships today; the service layer talks to
//! [`TenantStore`] so a SQL-backed ledger could be slotted in behind the
//! same interface.

pub mod memory;

pub use memory::{Ledger, Table, TenantRegistry, TenantStore};
