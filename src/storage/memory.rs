//! In-memory tenant store
//!
//! Each tenant owns one [`Ledger`] holding every table, guarded by a single
//! `RwLock`. Reads take the read lock; mutations run through
//! [`TenantStore::transaction`], which works on a copy of the ledger and
//! swaps it in only when the closure succeeds — the in-process equivalent
//! of the database transaction the original payment flow relied on. Two
//! concurrent payments against the same invoice serialize on the write
//! lock.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use crate::core::entity::Record;
use crate::core::error::{AppError, AppResult, EntityError, StorageError};
use crate::domain::{
    CashMovement, CashRegister, Category, Client, Invoice, Payment, Product, Purchase, StockLevel,
    StockMovement, Supplier, SupplierInvoice, SupplierPayment,
};

/// A single table of records keyed by id.
#[derive(Debug, Clone)]
pub struct Table<T: Record> {
    rows: HashMap<Uuid, T>,
}

impl<T: Record> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: HashMap::new(),
        }
    }
}

impl<T: Record> Table<T> {
    pub fn insert(&mut self, record: T) -> T {
        self.rows.insert(record.id(), record.clone());
        record
    }

    pub fn get(&self, id: &Uuid) -> Option<&T> {
        self.rows.get(id).filter(|r| !r.is_deleted())
    }

    /// Fetch a live record or fail with NOT_FOUND.
    pub fn require(&self, id: &Uuid) -> Result<&T, EntityError> {
        self.get(id)
            .ok_or_else(|| EntityError::not_found(T::entity_name(), *id))
    }

    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut T> {
        self.rows.get_mut(id).filter(|r| !r.is_deleted())
    }

    pub fn require_mut(&mut self, id: &Uuid) -> Result<&mut T, EntityError> {
        self.rows
            .get_mut(id)
            .filter(|r| !r.is_deleted())
            .ok_or_else(|| EntityError::not_found(T::entity_name(), *id))
    }

    /// Hard-delete a row. Most call sites prefer soft deletion.
    pub fn remove(&mut self, id: &Uuid) -> Option<T> {
        self.rows.remove(id)
    }

    /// Iterate live (not soft-deleted) rows in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values().filter(|r| !r.is_deleted())
    }

    /// Iterate every row, soft-deleted ones included. Used where deleted
    /// rows still matter, e.g. sequential code scans.
    pub fn iter_all(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.iter().filter(|r| predicate(r)).cloned().collect()
    }

    pub fn find(&self, predicate: impl Fn(&T) -> bool) -> Option<T> {
        self.iter().find(|r| predicate(r)).cloned()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All tables of one tenant.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub clients: Table<Client>,
    pub invoices: Table<Invoice>,
    pub payments: Table<Payment>,
    pub suppliers: Table<Supplier>,
    pub supplier_invoices: Table<SupplierInvoice>,
    pub supplier_payments: Table<SupplierPayment>,
    pub products: Table<Product>,
    pub categories: Table<Category>,
    pub stock_levels: Table<StockLevel>,
    pub stock_movements: Table<StockMovement>,
    pub purchases: Table<Purchase>,
    pub cash_registers: Table<CashRegister>,
    pub cash_movements: Table<CashMovement>,
}

impl Ledger {
    /// The currently open cash register, if any.
    pub fn open_cash_register(&self) -> Option<CashRegister> {
        self.cash_registers.find(|r| r.is_open())
    }
}

/// Thread-safe handle to a tenant's ledger.
#[derive(Clone, Default)]
pub struct TenantStore {
    ledger: Arc<RwLock<Ledger>>,
}

impl TenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a read-only closure against the ledger.
    pub fn read<R>(&self, f: impl FnOnce(&Ledger) -> R) -> AppResult<R> {
        let guard = self.ledger.read().map_err(|e| {
            AppError::Storage(StorageError::LockPoisoned {
                message: e.to_string(),
            })
        })?;
        Ok(f(&guard))
    }

    /// Run a mutating closure transactionally.
    ///
    /// The closure mutates a copy; an `Err` discards every change, `Ok`
    /// commits the copy atomically.
    pub fn transaction<R>(&self, f: impl FnOnce(&mut Ledger) -> AppResult<R>) -> AppResult<R> {
        let mut guard = self.ledger.write().map_err(|e| {
            AppError::Storage(StorageError::LockPoisoned {
                message: e.to_string(),
            })
        })?;
        let mut draft = guard.clone();
        let result = f(&mut draft)?;
        *guard = draft;
        Ok(result)
    }
}

/// Lazily-created per-tenant stores, keyed by subdomain.
///
/// The original backend spun up one database client per tenant database;
/// here each known subdomain gets its own isolated ledger.
#[derive(Default)]
pub struct TenantRegistry {
    stores: RwLock<HashMap<String, TenantStore>>,
}

impl TenantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get (or create) the store for a registered tenant subdomain.
    pub fn store(&self, subdomain: &str) -> AppResult<TenantStore> {
        {
            let stores = self.stores.read().map_err(|e| {
                AppError::Storage(StorageError::LockPoisoned {
                    message: e.to_string(),
                })
            })?;
            if let Some(store) = stores.get(subdomain) {
                return Ok(store.clone());
            }
        }
        let mut stores = self.stores.write().map_err(|e| {
            AppError::Storage(StorageError::LockPoisoned {
                message: e.to_string(),
            })
        })?;
        Ok(stores
            .entry(subdomain.to_string())
            .or_insert_with(TenantStore::new)
            .clone())
    }
}
