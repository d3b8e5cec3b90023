//! The per-(RFC, entity) audit resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel `ente` used when a solventación applies to the RFC as a whole
/// rather than to one specific entity.
pub const GENERAL: &str = "GENERAL";

/// An auditor's recorded decision for one `(rfc, ente)` pair. Upserted on
/// write; there is no terminal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solventacion {
    pub rfc: String,
    pub ente: String,
    pub estado: String,
    pub comentario: String,
    pub actualizado: DateTime<Utc>,
}
