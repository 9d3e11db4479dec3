//! countrygeo Reconcile - Country geodata reconciliation
//!
//! This crate decides the bounding box and center of each country from
//! geocoder candidates, applying per-country overrides where the generic
//! query is unreliable.

pub mod error;
pub mod naming;
pub mod overrides;
pub mod reconciler;
pub mod report;

pub use error::ReconcileError;
pub use overrides::{CenterRule, CornerEdit, OverrideStrategy, OverrideTable, Selector, SubQuery};
pub use reconciler::{CountrySelection, ReconcileProgress, Reconciler};
pub use report::{
    CountryReport, FailureReason, Outcome, QueryTrace, ReconciliationReport, ReportSummary,
    ResolutionPath,
};
