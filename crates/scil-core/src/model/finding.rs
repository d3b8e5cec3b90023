//! The cross-detector's output record.

use super::estado::SIN_VALORACION;
use super::source_row::SourceRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The two shapes a finding can take: an actual cross, or a traceability
/// record proving an RFC was checked and found clean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TipoPatron {
    #[serde(rename = "CRUCE_ENTRE_ENTES_QNA")]
    CruceEntreEntesQna,
    #[serde(rename = "SIN_DUPLICIDAD")]
    SinDuplicidad,
}

/// One logical finding: either a detected cross (`entes.len() >= 2`) or a
/// `SIN_DUPLICIDAD` traceability record.
///
/// `hash_firma` is left unset by the detector; [`scil_store`] computes and
/// fills it in before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub rfc: String,
    pub nombre: String,
    /// Sorted set of entity claves active in this quincena (or all claves
    /// seen for the RFC, for a `SIN_DUPLICIDAD` record).
    pub entes: BTreeSet<String>,
    /// `"{year}Q{NN}"`, or the sentinel `"SIN_DUPLICIDAD"`.
    pub fecha_comun: String,
    pub tipo_patron: TipoPatron,
    pub descripcion: String,
    pub registros: Vec<SourceRow>,
    pub estado: String,
    #[serde(default)]
    pub solventacion: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub hash_firma: Option<String>,
}

/// Sentinel `fecha_comun` for traceability records.
pub const SIN_DUPLICIDAD_FECHA: &str = "SIN_DUPLICIDAD";

impl Finding {
    /// Build a `CRUCE_ENTRE_ENTES_QNA` finding. `registros` must already be
    /// filtered to the rows active in this quincena, ascending by the
    /// original per-RFC row order.
    pub fn cruce(
        rfc: String,
        nombre: String,
        entes: BTreeSet<String>,
        fecha_comun: String,
        registros: Vec<SourceRow>,
    ) -> Self {
        let descripcion = format!(
            "RFC {rfc} recibió pago de {} entes distintos en {fecha_comun}: {}",
            entes.len(),
            entes.iter().cloned().collect::<Vec<_>>().join(", ")
        );
        Self {
            rfc,
            nombre,
            entes,
            fecha_comun,
            tipo_patron: TipoPatron::CruceEntreEntesQna,
            descripcion,
            registros,
            estado: SIN_VALORACION.to_string(),
            solventacion: String::new(),
            hash_firma: None,
        }
    }

    /// Build a `SIN_DUPLICIDAD` traceability record for an RFC with no cross.
    pub fn sin_duplicidad(
        rfc: String,
        nombre: String,
        entes: BTreeSet<String>,
        registros: Vec<SourceRow>,
    ) -> Self {
        let descripcion = format!("RFC {rfc} sin duplicidad detectada entre entes");
        Self {
            rfc,
            nombre,
            entes,
            fecha_comun: SIN_DUPLICIDAD_FECHA.to_string(),
            tipo_patron: TipoPatron::SinDuplicidad,
            descripcion,
            registros,
            estado: SIN_VALORACION.to_string(),
            solventacion: String::new(),
            hash_firma: None,
        }
    }

    /// The entities pairwise intersecting on at least one active quincena
    /// within this finding's own `registros`. Used by the exporter to guard
    /// against legacy findings whose `entes` field drifted from its rows.
    pub fn entes_cruce_real(&self) -> BTreeSet<String> {
        use std::collections::HashMap;

        let mut by_qna: HashMap<crate::quincena::QnaNumber, BTreeSet<&str>> = HashMap::new();
        for row in &self.registros {
            for &q in &row.qnas {
                by_qna.entry(q).or_default().insert(row.ente.as_str());
            }
        }
        by_qna
            .into_values()
            .filter(|entes| entes.len() >= 2)
            .flatten()
            .map(str::to_string)
            .collect()
    }
}
