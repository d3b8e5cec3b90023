//! Catalog entries: state entities and municipalities.

use serde::{Deserialize, Serialize};

/// Whether a catalog entry is a state-level entity or a municipality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ambito {
    #[serde(rename = "ESTATAL")]
    Estatal,
    #[serde(rename = "MUNICIPAL")]
    Municipal,
}

/// A single catalog entry, loaded once from `entes.xlsx` / `municipios.xlsx`
/// and never mutated at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Canonical identifier, e.g. `ENTE_00123` or `MUN_07`. Unique across the
    /// union of entities and municipalities.
    pub clave: String,
    pub nombre: String,
    pub siglas: String,
    pub clasificacion: String,
    pub ambito: Ambito,
    pub activo: bool,
}

impl Entity {
    /// The preferred display label: siglas if present, else nombre, else clave.
    pub fn display_label(&self) -> &str {
        if !self.siglas.trim().is_empty() {
            &self.siglas
        } else if !self.nombre.trim().is_empty() {
            &self.nombre
        } else {
            &self.clave
        }
    }
}
