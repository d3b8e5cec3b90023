//! C3 — the cross-entity duplication detector.
//!
//! Per-RFC inputs are disjoint, so the per-RFC pass is parallelized with
//! rayon; the insertion-order contract below is preserved because
//! `par_iter().map(..).collect()` on an indexed iterator keeps output order
//! aligned with input order regardless of which thread finished first.

use rayon::prelude::*;
use scil_core::model::{Finding, SourceRow};
use scil_core::quincena::QnaNumber;
use std::collections::{BTreeSet, HashMap};

/// Run the detector over every row ingested in this batch.
///
/// `rows_in_order` must list rows in the order they were first encountered
/// across the batch's workbooks and sheets — that order, not RFC value,
/// determines the order findings are emitted in. `year` is the batch's
/// fiscal year, used to stamp `fecha_comun`.
///
/// Ordering contract: findings come out in RFC-first-appearance order, and
/// within an RFC, in ascending quincena order. Re-running on the same input
/// produces byte-identical findings.
pub fn detect(rows_in_order: &[SourceRow], year: i32) -> Vec<Finding> {
    let mut rfc_order: Vec<String> = Vec::new();
    let mut grouped: HashMap<String, Vec<SourceRow>> = HashMap::new();
    for row in rows_in_order {
        grouped
            .entry(row.rfc.clone())
            .or_insert_with(|| {
                rfc_order.push(row.rfc.clone());
                Vec::new()
            })
            .push(row.clone());
    }

    rfc_order
        .par_iter()
        .map(|rfc| detect_for_rfc(rfc, &grouped[rfc], year))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}

/// Detect crosses for a single RFC's rows.
///
/// An RFC with zero quincenas where two or more distinct entities overlap —
/// whether because it has fewer than two rows, or because its rows never
/// share an active quincena — contributes exactly one `SIN_DUPLICIDAD`
/// traceability record instead of any crosses.
fn detect_for_rfc(rfc: &str, rows: &[SourceRow], year: i32) -> Vec<Finding> {
    let mut active_qnas: BTreeSet<QnaNumber> = BTreeSet::new();
    for row in rows {
        active_qnas.extend(row.qnas.iter().copied());
    }

    let mut crosses = Vec::new();
    for q in active_qnas {
        let active_rows: Vec<SourceRow> = rows.iter().filter(|r| r.active_in(q)).cloned().collect();
        let entes_q: BTreeSet<String> = active_rows.iter().map(|r| r.ente.clone()).collect();
        if entes_q.len() >= 2 {
            let nombre = active_rows[0].nombre.clone();
            let fecha_comun = q.fecha_comun(year);
            crosses.push(Finding::cruce(
                rfc.to_string(),
                nombre,
                entes_q,
                fecha_comun,
                active_rows,
            ));
        }
    }

    if crosses.is_empty() {
        let distinct_entes: BTreeSet<String> = rows.iter().map(|r| r.ente.clone()).collect();
        let nombre = rows.first().map(|r| r.nombre.clone()).unwrap_or_default();
        vec![Finding::sin_duplicidad(
            rfc.to_string(),
            nombre,
            distinct_entes,
            rows.to_vec(),
        )]
    } else {
        crosses
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scil_core::model::TipoPatron;

    fn row(rfc: &str, ente: &str, nombre: &str, qnas: &[u8]) -> SourceRow {
        SourceRow {
            rfc: rfc.to_string(),
            nombre: nombre.to_string(),
            puesto: "Analista".to_string(),
            fecha_alta: None,
            fecha_baja: None,
            ente: ente.to_string(),
            monto: None,
            qnas: qnas.iter().map(|&n| QnaNumber::new(n).unwrap()).collect(),
        }
    }

    #[test]
    fn two_entities_one_shared_quincena_is_one_cross() {
        let rows = vec![
            row("CUPU800825569", "ENTE_00003", "Juan Perez", &[3]),
            row("CUPU800825569", "ENTE_00002", "Juan Perez", &[3]),
        ];
        let findings = detect(&rows, 2026);
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.tipo_patron, TipoPatron::CruceEntreEntesQna);
        assert_eq!(f.fecha_comun, "2026Q03");
        assert_eq!(
            f.entes,
            ["ENTE_00002", "ENTE_00003"].into_iter().map(String::from).collect()
        );
    }

    #[test]
    fn same_entity_two_rows_same_quincena_is_not_a_cross() {
        let rows = vec![
            row("CUPU800825569", "ENTE_00003", "Juan Perez", &[5]),
            row("CUPU800825569", "ENTE_00003", "Juan Perez", &[5]),
        ];
        let findings = detect(&rows, 2026);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].tipo_patron, TipoPatron::SinDuplicidad);
        assert_eq!(
            findings[0].entes,
            ["ENTE_00003"].into_iter().map(String::from).collect()
        );
    }

    #[test]
    fn inactive_elsewhere_yields_zero_findings_crosses() {
        // One RFC active in SEPE for QNA1..12 and in SEFIN with all zeros:
        // SEFIN contributes no active quincenas, so there is no cross.
        let mut sepe_qnas = vec![];
        for n in 1..=12u8 {
            sepe_qnas.push(n);
        }
        let rows = vec![
            row("CUPU800825569", "ENTE_00002", "Juan Perez", &sepe_qnas),
            row("CUPU800825569", "ENTE_00003", "Juan Perez", &[]),
        ];
        let findings = detect(&rows, 2026);
        assert!(findings.iter().all(|f| f.tipo_patron == TipoPatron::SinDuplicidad));
    }

    #[test]
    fn twelve_active_quincenas_across_entities_produce_twelve_crosses() {
        let qnas: Vec<u8> = (1..=12).collect();
        let rows = vec![
            row("CUPU800825569", "ENTE_00002", "Juan Perez", &qnas),
            row("CUPU800825569", "ENTE_00003", "Juan Perez", &qnas),
        ];
        let findings = detect(&rows, 2026);
        assert_eq!(findings.len(), 12);
        let mut nums: Vec<u8> = findings
            .iter()
            .map(|f| f.fecha_comun.rsplit('Q').next().unwrap().parse().unwrap())
            .collect();
        nums.sort_unstable();
        assert_eq!(nums, qnas);
    }

    #[test]
    fn findings_are_emitted_in_rfc_first_seen_order() {
        let rows = vec![
            row("BBBB800825569", "ENTE_00002", "B", &[1]),
            row("BBBB800825569", "ENTE_00003", "B", &[1]),
            row("AAAA800825569", "ENTE_00002", "A", &[1]),
            row("AAAA800825569", "ENTE_00003", "A", &[1]),
        ];
        let findings = detect(&rows, 2026);
        assert_eq!(findings[0].rfc, "BBBB800825569");
        assert_eq!(findings[1].rfc, "AAAA800825569");
    }

    #[test]
    fn detection_is_deterministic_across_reruns() {
        let rows = vec![
            row("CUPU800825569", "ENTE_00003", "Juan Perez", &[3, 7]),
            row("CUPU800825569", "ENTE_00002", "Juan Perez", &[3]),
        ];
        let a = detect(&rows, 2026);
        let b = detect(&rows, 2026);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }
}
