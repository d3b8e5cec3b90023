//! User-visible, non-fatal ingestion alerts.

use serde::Serialize;

/// A structured, user-visible ingestion alert. Input-shape problems are
/// never fatal — they accumulate here while the rest of the batch proceeds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub tipo: String,
    pub mensaje: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hoja: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archivo: Option<String>,
}

impl Alert {
    /// A sheet's title did not resolve to any catalog entity.
    pub fn ente_no_encontrado(hoja: &str, archivo: &str) -> Self {
        Self {
            tipo: "ente_no_encontrado".to_string(),
            mensaje: format!("La hoja '{hoja}' no corresponde a ningún ente del catálogo"),
            hoja: Some(hoja.to_string()),
            archivo: Some(archivo.to_string()),
        }
    }

    /// A sheet is missing one or more of the required columns.
    pub fn columnas_faltantes(hoja: &str, archivo: &str, faltantes: &[String]) -> Self {
        Self {
            tipo: "columnas_faltantes".to_string(),
            mensaje: format!(
                "La hoja '{hoja}' no tiene las columnas requeridas: {}",
                faltantes.join(", ")
            ),
            hoja: Some(hoja.to_string()),
            archivo: Some(archivo.to_string()),
        }
    }
}
