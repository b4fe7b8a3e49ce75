//! `costgrid-recon` - financing-cost classification, total reconciliation and
//! per-document record building.
//!
//! Pure crate: receives loaded workbooks, returns records. No CLI or IO
//! dependencies beyond reading its own config file.

pub mod classify;
pub mod config;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod hard_costs;
pub mod model;
pub mod reconcile;

pub use config::ExtractConfig;
pub use engine::{build_record, failed_record};
pub use error::ExtractError;
pub use model::{CostCategory, DocumentRecord, HardCostSource, SectionKind};
pub use reconcile::{reconcile, Reconciliation};
