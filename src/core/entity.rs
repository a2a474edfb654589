//! Base record abstraction shared by all domain entities
//!
//! Every stored row carries the same metadata: a UUID, creation and update
//! timestamps, and an optional soft-deletion timestamp. The [`Record`] trait
//! exposes that metadata generically so the storage layer can index and
//! filter any entity type the same way. Entities embed the fields directly
//! and use [`impl_record!`] to wire up the trait.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all stored domain records.
pub trait Record: Clone + Send + Sync + 'static {
    /// The singular entity name used in errors (e.g., "client", "invoice")
    fn entity_name() -> &'static str;

    /// Get the unique identifier for this record
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Get the soft-deletion timestamp, if any
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Refresh the update timestamp after a mutation
    fn touch(&mut self);

    /// Check if the record has been soft-deleted
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}

/// Implements [`Record`] for a struct carrying the base metadata fields
/// (`id`, `created_at`, `updated_at`, `deleted_at`).
#[macro_export]
macro_rules! impl_record {
    ($type:ident, $name:literal) => {
        impl $crate::core::entity::Record for $type {
            fn entity_name() -> &'static str {
                $name
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn deleted_at(&self) -> Option<::chrono::DateTime<::chrono::Utc>> {
                self.deleted_at
            }

            fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug)]
    struct Widget {
        id: Uuid,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    }

    impl_record!(Widget, "widget");

    #[test]
    fn record_macro_implements_metadata_access() {
        let now = Utc::now();
        let mut widget = Widget {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        assert_eq!(Widget::entity_name(), "widget");
        assert!(!widget.is_deleted());

        widget.touch();
        assert!(widget.updated_at() >= now);

        widget.deleted_at = Some(Utc::now());
        assert!(widget.is_deleted());
    }
}
