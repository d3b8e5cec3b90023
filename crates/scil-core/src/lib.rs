//! # scil-core
//!
//! Core domain model for the cross-entity payroll incompatibility auditor:
//! catalog entries, source rows, findings, and the audit-resolution types
//! built on top of them, plus the immutable entity catalog (C1) used to
//! resolve sheet labels and user entity tokens to canonical claves.
//!
//! This crate has no I/O and no persistence; it defines the shapes that
//! `scil-ingest`, `scil-store`, and `scil-export` operate on.

pub mod catalog;
pub mod error;
pub mod model;
pub mod quincena;

pub use catalog::Catalog;
pub use error::{CoreError, CoreResult};
