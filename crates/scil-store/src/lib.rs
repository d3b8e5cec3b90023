//! # scil-store
//!
//! Content-addressed persistence of findings (C4): SQLite-backed, with a
//! uniqueness constraint on `hash_firma` as the only required
//! synchronization for concurrent ingest calls, plus upserts for the
//! per-(RFC, entity) solventación audit trail.

pub mod catalog_repo;
pub mod error;
pub mod findings;
pub mod hash;
pub mod merged;
pub mod schema;

pub use catalog_repo::{load_catalog, load_usuarios, save_entidades_estatales, save_municipios, save_usuarios};
pub use error::{StoreError, StoreResult};
pub use findings::{FindingStore, SolventacionView};
pub use hash::hash_firma;
pub use merged::MergedRecord;
