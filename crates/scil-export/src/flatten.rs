//! `flatten_export` (C5): one row per unique
//! `(rfc, ente_origen, puesto, fecha_ingreso, fecha_egreso, monto)` key,
//! accumulated across every finding that touches it.

use rust_decimal::Decimal;
use scil_core::catalog::Catalog;
use scil_core::model::{estatus_label, Finding};
use scil_core::quincena::QnaNumber;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One flattened row, ready for a CSV/XLSX writer at the boundary layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlatRow {
    pub rfc: String,
    pub nombre: String,
    pub ente_origen: String,
    pub puesto: String,
    pub fecha_alta: Option<String>,
    pub fecha_baja: Option<String>,
    pub monto: Option<Decimal>,
    pub quincenas: String,
    pub entes_incompatibilidad: String,
    pub estatus: String,
    pub solventacion: String,
}

type Key = (String, String, String, Option<String>, Option<String>, Option<String>);

#[derive(Default)]
struct Accumulator {
    nombre: String,
    qnas: BTreeSet<u8>,
    otros_entes: BTreeSet<String>,
    base_estado: String,
    solventacion: String,
    monto: Option<Decimal>,
}

/// Flatten a batch of findings into one row per accumulation key.
///
/// `solventaciones` maps `(rfc, ente_clave)` to `(estado, comentario)`; when
/// present for a key's `(rfc, ente_origen)` pair it overrides the finding's
/// own estado/solventacion text.
pub fn flatten_export(
    findings: &[Finding],
    catalog: &Catalog,
    solventaciones: &HashMap<(String, String), (String, String)>,
) -> Vec<FlatRow> {
    let mut order: Vec<Key> = Vec::new();
    let mut acc: BTreeMap<Key, Accumulator> = BTreeMap::new();

    for finding in findings {
        let qna_num = quincena_from_fecha_comun(&finding.fecha_comun);
        let otros: BTreeSet<String> = finding.entes.clone();

        for row in &finding.registros {
            let key: Key = (
                finding.rfc.clone(),
                sanitize(&row.ente),
                row.puesto.clone(),
                row.fecha_alta.clone(),
                row.fecha_baja.clone(),
                row.monto.map(|m| m.to_string()),
            );

            let entry = acc.entry(key.clone()).or_insert_with(|| {
                order.push(key.clone());
                Accumulator::default()
            });
            entry.nombre = finding.nombre.clone();
            entry.monto = row.monto;
            if let Some(q) = qna_num {
                entry.qnas.insert(q);
            }
            entry.otros_entes.extend(otros.iter().filter(|e| **e != row.ente).cloned());
            entry.base_estado = estatus_label(&finding.estado).to_string();
            if !finding.solventacion.trim().is_empty() {
                entry.solventacion = finding.solventacion.clone();
            }
        }
    }

    order
        .into_iter()
        .map(|key| {
            let a = acc.remove(&key).expect("key was just pushed to order");
            let (rfc, ente_origen, puesto, fecha_alta, fecha_baja, _monto_key) = key;

            let sol = solventaciones.get(&(rfc.clone(), ente_origen.clone()));
            let estatus = sol.map(|(e, _)| e.clone()).unwrap_or(a.base_estado);
            let solventacion = sol.map(|(_, c)| c.clone()).unwrap_or(a.solventacion);

            FlatRow {
                rfc,
                nombre: a.nombre,
                ente_origen: catalog.display(&ente_origen),
                puesto,
                fecha_alta,
                fecha_baja,
                monto: a.monto,
                quincenas: format_quincenas(&a.qnas),
                entes_incompatibilidad: format_entes(&a.otros_entes, catalog),
                estatus,
                solventacion,
            }
        })
        .collect()
}

fn quincena_from_fecha_comun(fecha_comun: &str) -> Option<u8> {
    let suffix = fecha_comun.rsplit('Q').next()?;
    let n: u8 = suffix.parse().ok()?;
    QnaNumber::new(n).ok().map(QnaNumber::get)
}

fn format_quincenas(qnas: &BTreeSet<u8>) -> String {
    if qnas.len() >= 24 {
        "Activo en Todo el Ejercicio".to_string()
    } else if qnas.is_empty() {
        "N/A".to_string()
    } else {
        qnas.iter().map(|n| format!("QNA{n}")).collect::<Vec<_>>().join(", ")
    }
}

fn format_entes(entes: &BTreeSet<String>, catalog: &Catalog) -> String {
    if entes.is_empty() {
        return "Sin otros entes".to_string();
    }
    let mut siglas: Vec<String> = entes.iter().map(|e| catalog.display(e)).collect();
    siglas.sort();
    siglas.join(", ")
}

/// Legacy sheet names occasionally carried characters unsafe for downstream
/// filenames; entity claves from the catalog never do, so this is a no-op
/// today but keeps the key shape explicit about its intent.
fn sanitize(ente: &str) -> String {
    ente.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scil_core::model::{Ambito, Entity, SourceRow};
    use scil_core::quincena::QnaNumber;

    fn catalog() -> Catalog {
        Catalog::build([
            Entity {
                clave: "ENTE_00002".to_string(),
                nombre: "Secretaria de Finanzas".to_string(),
                siglas: "SEFIN".to_string(),
                clasificacion: "Secretaria".to_string(),
                ambito: Ambito::Estatal,
                activo: true,
            },
            Entity {
                clave: "ENTE_00003".to_string(),
                nombre: "Secretaria de Educacion".to_string(),
                siglas: "SEPE".to_string(),
                clasificacion: "Secretaria".to_string(),
                ambito: Ambito::Estatal,
                activo: true,
            },
        ])
        .unwrap()
    }

    fn row(ente: &str, qna: u8) -> SourceRow {
        SourceRow {
            rfc: "CUPU800825569".to_string(),
            nombre: "Juan Perez".to_string(),
            puesto: "Analista".to_string(),
            fecha_alta: None,
            fecha_baja: None,
            ente: ente.to_string(),
            monto: None,
            qnas: [QnaNumber::new(qna).unwrap()].into_iter().collect(),
        }
    }

    #[test]
    fn twenty_four_quincenas_yield_the_full_exercise_sentinel() {
        let cat = catalog();
        let findings: Vec<Finding> = (1..=24u8)
            .map(|q| {
                Finding::cruce(
                    "CUPU800825569".to_string(),
                    "Juan Perez".to_string(),
                    ["ENTE_00002", "ENTE_00003"].into_iter().map(String::from).collect(),
                    format!("2026Q{q:02}"),
                    vec![row("ENTE_00002", q), row("ENTE_00003", q)],
                )
            })
            .collect();
        let sol = HashMap::new();
        let rows = flatten_export(&findings, &cat, &sol);
        let sefin_row = rows.iter().find(|r| r.ente_origen == "SEFIN").unwrap();
        assert_eq!(sefin_row.quincenas, "Activo en Todo el Ejercicio");
    }

    #[test]
    fn no_other_entities_yields_sin_otros_entes() {
        let cat = catalog();
        let sin_dup = Finding::sin_duplicidad(
            "OTRO800825569".to_string(),
            "Ana Lopez".to_string(),
            ["ENTE_00002"].into_iter().map(String::from).collect(),
            vec![row("ENTE_00002", 1)],
        );
        let sol = HashMap::new();
        let rows = flatten_export(&[sin_dup], &cat, &sol);
        assert_eq!(rows[0].entes_incompatibilidad, "Sin otros entes");
    }

    #[test]
    fn solventacion_override_wins_over_base_estado() {
        let cat = catalog();
        let mut finding = Finding::cruce(
            "CUPU800825569".to_string(),
            "Juan Perez".to_string(),
            ["ENTE_00002", "ENTE_00003"].into_iter().map(String::from).collect(),
            "2026Q03".to_string(),
            vec![row("ENTE_00002", 3), row("ENTE_00003", 3)],
        );
        finding.estado = "Sin valoración".to_string();
        let mut sol = HashMap::new();
        sol.insert(
            ("CUPU800825569".to_string(), "ENTE_00002".to_string()),
            ("Solventado".to_string(), "revisado".to_string()),
        );
        let rows = flatten_export(&[finding], &cat, &sol);
        let sefin_row = rows.iter().find(|r| r.ente_origen == "SEFIN").unwrap();
        assert_eq!(sefin_row.estatus, "Solventado");
        assert_eq!(sefin_row.solventacion, "revisado");
    }
}
