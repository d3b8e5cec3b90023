//! `grouped_by_entity` (C5): one row per (finding, qualifying entity) the
//! caller's user tokens are authorized to see, plus a zero-cross summary for
//! entities with employees but no crosses.

use scil_core::catalog::Catalog;
use scil_core::model::Finding;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// One row under an entity's display name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedRow {
    pub rfc: String,
    pub nombre: String,
    /// Distinct `registros[].puesto` values, comma-joined.
    pub puesto: String,
    pub estado: String,
    /// The *other* entities in `entes_cruce_real`, as siglas.
    pub entes: Vec<String>,
    /// Per other-entity effective estado: solventación if recorded, else
    /// this finding's own estado.
    pub estado_entes: BTreeMap<String, String>,
}

/// Everything shown for one entity's display name.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct EntityGroup {
    pub rows: Vec<GroupedRow>,
    /// Distinct RFCs this entity participates in a real cross for.
    pub duplicados: usize,
    /// Distinct RFCs with any registro under this entity, crossed or not.
    pub total: usize,
}

/// Build the grouped-by-entity view.
///
/// `solventaciones` maps `(rfc, ente_clave)` to its recorded estado; entries
/// absent from it fall back to the finding's own estado. `user_tokens`
/// gates visibility through [`Catalog::matches`] / [`Catalog::has_full_access`];
/// an empty or fully-authorized token list sees everything.
pub fn grouped_by_entity(
    findings: &[Finding],
    catalog: &Catalog,
    solventaciones: &HashMap<(String, String), String>,
    user_tokens: &[String],
) -> BTreeMap<String, EntityGroup> {
    let mut groups: BTreeMap<String, EntityGroup> = BTreeMap::new();
    let mut crossed_rfcs: HashMap<String, BTreeSet<String>> = HashMap::new();
    let mut total_rfcs: HashMap<String, BTreeSet<String>> = HashMap::new();

    let authorized = |clave: &str| -> bool {
        catalog.has_full_access(user_tokens)
            || user_tokens.iter().any(|t| catalog.matches(t, clave))
    };

    for finding in findings {
        for row in &finding.registros {
            total_rfcs.entry(row.ente.clone()).or_default().insert(finding.rfc.clone());
        }

        let entes_cruce = finding.entes_cruce_real();
        if entes_cruce.len() < 2 {
            continue;
        }

        let puesto = distinct_puestos(finding);
        for ente in &entes_cruce {
            crossed_rfcs.entry(ente.clone()).or_default().insert(finding.rfc.clone());

            if !authorized(ente) {
                continue;
            }
            let display = catalog.display(ente);
            let others: Vec<String> = entes_cruce
                .iter()
                .filter(|e| *e != ente)
                .map(|e| catalog.display(e))
                .collect();
            let estado_entes: BTreeMap<String, String> = entes_cruce
                .iter()
                .filter(|e| *e != ente)
                .map(|e| {
                    let estado = solventaciones
                        .get(&(finding.rfc.clone(), e.clone()))
                        .cloned()
                        .unwrap_or_else(|| finding.estado.clone());
                    (catalog.display(e), estado)
                })
                .collect();

            groups.entry(display).or_default().rows.push(GroupedRow {
                rfc: finding.rfc.clone(),
                nombre: finding.nombre.clone(),
                puesto: puesto.clone(),
                estado: finding.estado.clone(),
                entes: others,
                estado_entes,
            });
        }
    }

    for (clave, rfcs) in &total_rfcs {
        if !authorized(clave) {
            continue;
        }
        let display = catalog.display(clave);
        let group = groups.entry(display).or_default();
        group.total = rfcs.len();
        group.duplicados = crossed_rfcs.get(clave).map(|s| s.len()).unwrap_or(0);
    }

    groups
}

fn distinct_puestos(finding: &Finding) -> String {
    let mut seen = BTreeSet::new();
    for row in &finding.registros {
        if !row.puesto.trim().is_empty() {
            seen.insert(row.puesto.clone());
        }
    }
    seen.into_iter().collect::<Vec<_>>().join(", ")
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
    fn real_cross_lists_other_entity_as_sigla() {
        let cat = catalog();
        let finding = Finding::cruce(
            "CUPU800825569".to_string(),
            "Juan Perez".to_string(),
            ["ENTE_00002", "ENTE_00003"].into_iter().map(String::from).collect(),
            "2026Q03".to_string(),
            vec![row("ENTE_00002", 3), row("ENTE_00003", 3)],
        );
        let sol = HashMap::new();
        let groups = grouped_by_entity(&[finding], &cat, &sol, &["TODOS".to_string()]);

        let sefin = &groups["SEFIN"];
        assert_eq!(sefin.rows.len(), 1);
        assert_eq!(sefin.rows[0].entes, vec!["SEPE".to_string()]);
        assert_eq!(sefin.duplicados, 1);
        assert_eq!(sefin.total, 1);
    }

    #[test]
    fn unauthorized_user_sees_nothing() {
        let cat = catalog();
        let finding = Finding::cruce(
            "CUPU800825569".to_string(),
            "Juan Perez".to_string(),
            ["ENTE_00002", "ENTE_00003"].into_iter().map(String::from).collect(),
            "2026Q03".to_string(),
            vec![row("ENTE_00002", 3), row("ENTE_00003", 3)],
        );
        let sol = HashMap::new();
        let groups = grouped_by_entity(&[finding], &cat, &sol, &["MUN_01".to_string()]);
        assert!(groups.is_empty());
    }

    #[test]
    fn non_crossing_entity_still_lists_zero_duplicados() {
        let cat = catalog();
        let sin_dup = Finding::sin_duplicidad(
            "OTRO800825569".to_string(),
            "Ana Lopez".to_string(),
            ["ENTE_00002"].into_iter().map(String::from).collect(),
            vec![row("ENTE_00002", 1)],
        );
        let sol = HashMap::new();
        let groups = grouped_by_entity(&[sin_dup], &cat, &sol, &["TODOS".to_string()]);
        let sefin = &groups["SEFIN"];
        assert_eq!(sefin.duplicados, 0);
        assert_eq!(sefin.total, 1);
        assert!(sefin.rows.is_empty());
    }
}
