//! The `get_by_rfc` read model: every finding for an RFC merged into one
//! view, with per-entity estado fusion.

use scil_core::model::SourceRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// All findings for one RFC folded into a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRecord {
    pub rfc: String,
    pub nombre: String,
    /// Union of `entes` across every finding for this RFC.
    pub entes: BTreeSet<String>,
    /// Source rows deduplicated on `(ente, puesto, monto, fecha_alta, fecha_baja)`.
    pub registros: Vec<SourceRow>,
    /// Fused across every entity this RFC touches: unanimous if every entity
    /// agrees (solventación estado if recorded, else the finding's own),
    /// `"Mixto"` otherwise.
    pub estado: String,
    /// The most recently inserted finding's free-text comment.
    pub solventacion: String,
}
