//! # scil-export
//!
//! Deterministic read views over persisted findings (C5): entity-grouped
//! audit views and flattened export rows with fused per-(RFC,entity) status.
//! Consumers (the HTTP boundary, CSV/XLSX writers) sit outside this crate.

pub mod flatten;
pub mod group;

pub use flatten::{flatten_export, FlatRow};
pub use group::{grouped_by_entity, EntityGroup, GroupedRow};
