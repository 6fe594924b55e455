//! `mediagrid-recon`: inventory-vs-catalog completeness engine.
//!
//! Pure engine crate: receives enumerated inventory and a catalog client,
//! returns per-item completeness results. No CLI, HTTP or spreadsheet
//! dependencies.

pub mod cache;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod model;
pub mod summary;

pub use cache::{CacheStats, LookupCache};
pub use catalog::{CatalogClient, CatalogId};
pub use engine::{classify_group, reconcile};
pub use error::CatalogError;
pub use model::{
    CatalogEntry, ExternalIds, GroupStatus, GroupUnitCount, InventoryItem, Lookup, MediaAttributes,
    ReconciliationResult, Status,
};
pub use summary::{compute_summary, ReconSummary};
