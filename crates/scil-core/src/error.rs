//! Error types shared by the core domain model and catalog.

use thiserror::Error;

/// Errors raised while building or querying the domain model.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Two distinct catalog entries (entity or municipality) share a `clave`.
    #[error("duplicate clave in catalog: {0}")]
    DuplicateClave(String),

    /// A quincena index fell outside the valid `1..=24` range.
    #[error("invalid quincena number: {0} (must be 1..=24)")]
    InvalidQuincena(u8),

    /// An RFC failed the `/^[A-Z0-9]{10,13}$/` shape check after cleaning.
    #[error("invalid RFC: {0}")]
    InvalidRfc(String),
}

/// Result alias for core domain operations.
pub type CoreResult<T> = Result<T, CoreError>;
