//! Core abstractions: records, errors, money, tenancy, auth, pagination

pub mod auth;
pub mod entity;
pub mod error;
pub mod money;
pub mod pagination;
pub mod tenant;

pub use entity::Record;
pub use error::{AppError, AppResult};
