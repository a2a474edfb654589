//! Accounts payable: supplier payments, reversal and aging.

pub mod service;

pub use service::PayablesService;
