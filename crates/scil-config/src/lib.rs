//! # scil-config
//!
//! Runtime configuration for the payroll incompatibility auditor host:
//! store location, bind port, and fiscal year. Governs the runtime host,
//! not the core detection algorithms.

pub mod error;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use schema::{RuntimeConfig, SeedPaths};
pub use validation::validate;
