//! Accounts receivable: payment allocation, aging and reporting.

pub mod aging;
pub mod allocation;
pub mod service;

pub use aging::AgeBucket;
pub use allocation::{Distribution, Share, allocate};
pub use service::ReceivablesService;
