//! Errors raised by the finding store.

use thiserror::Error;

/// Errors raised while persisting or reading findings and solventaciones.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Any store error other than the hash-uniqueness violation handled by
    /// [`crate::findings::FindingStore::save`]'s dedup path. Store section 7
    /// requires these to fail the transaction and surface to the caller.
    #[error("store error: {0}")]
    Database(#[from] sqlx::Error),

    /// A persisted `datos` column failed to decode as a `Finding`.
    #[error("corrupt finding record (id={id}): {source}")]
    CorruptRecord {
        id: i64,
        #[source]
        source: serde_json::Error,
    },

    /// The persisted `entes`/`municipios` tables contained a duplicate clave.
    #[error("corrupt catalog tables: {0}")]
    CorruptCatalog(#[from] scil_core::CoreError),
}

/// Result alias for finding-store operations.
pub type StoreResult<T> = Result<T, StoreError>;
