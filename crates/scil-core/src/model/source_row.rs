//! The canonical per-worker row produced by ingestion.

use crate::quincena::QnaNumber;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One employee record from one entity's sheet, after cleaning.
///
/// Not persisted as-is: only the rows referenced by a [`crate::model::Finding`]
/// survive past a single ingest call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    /// Cleaned RFC; always matches `^[A-Z0-9]{10,13}$`.
    pub rfc: String,
    pub nombre: String,
    pub puesto: String,
    /// ISO `YYYY-MM-DD`, or `None` if absent/unparseable.
    pub fecha_alta: Option<String>,
    pub fecha_baja: Option<String>,
    /// Resolved entity `clave` (see `scil_core::Catalog::resolve`).
    pub ente: String,
    /// Perception total, when the sheet carries `TOT_PERC`.
    pub monto: Option<Decimal>,
    /// Quincenas for which `active(cell)` held, per the detector's contract
    /// this is the only form of `qnas` that survives normalization.
    pub qnas: BTreeSet<QnaNumber>,
}

impl SourceRow {
    /// True iff this row is active in the given quincena.
    pub fn active_in(&self, q: QnaNumber) -> bool {
        self.qnas.contains(&q)
    }

    /// The identity tuple used to deduplicate rows when merging findings
    /// across an RFC's history in `get_by_rfc`.
    pub fn dedup_key(&self) -> (String, String, Option<String>, Option<String>, Option<String>) {
        (
            self.ente.clone(),
            self.puesto.clone(),
            self.monto.map(|m| m.to_string()),
            self.fecha_alta.clone(),
            self.fecha_baja.clone(),
        )
    }
}
