//! Catalog-related error types
//!
//! Structured errors for catalog traversal and visibility resolution.
//! Integrity verification collects findings as strings instead
//! (see `Catalog::verify_catalog_integrity`); these types cover the
//! hard failures a resolver call can hit on a broken catalog.

use thiserror::Error;

/// Catalog traversal and resolution errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// A theme or group child names a layer absent from the catalog
    #[error("Layer '{child}' referenced by '{parent}' not found in catalog")]
    UnknownLayer { parent: String, child: String },

    /// A theme or group child names a group absent from the catalog
    #[error("Group '{child}' referenced by '{parent}' not found in catalog")]
    UnknownGroup { parent: String, child: String },

    /// An operation named an interface the catalog does not declare
    #[error("Interface '{0}' not found in catalog")]
    UnknownInterface(String),
}
