//! C2 — turning an uploaded workbook into canonical source rows plus alerts.

use crate::alert::Alert;
use crate::error::{IngestError, IngestResult};
use crate::normalize::{clean_date_cell, clean_rfc};
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use rust_decimal::Decimal;
use scil_core::catalog::Catalog;
use scil_core::model::SourceRow;
use scil_core::quincena::QnaNumber;
use std::collections::BTreeSet;
use std::path::Path;
use std::str::FromStr;

const REQUIRED_COLUMNS: &[&str] = &["RFC", "NOMBRE", "PUESTO", "FECHA_ALTA", "FECHA_BAJA"];

/// The result of parsing one workbook: the rows that survived cleaning, and
/// every sheet- or row-level alert raised along the way.
#[derive(Debug, Default)]
pub struct ParseOutcome {
    pub rows: Vec<SourceRow>,
    pub alerts: Vec<Alert>,
}

/// Parse every sheet of `path` against `catalog`.
///
/// Each sheet is treated independently: a sheet whose title doesn't resolve,
/// or that is missing a required column, contributes an alert and zero rows
/// but never aborts the rest of the workbook.
pub fn parse_workbook(path: &Path, catalog: &Catalog) -> IngestResult<ParseOutcome> {
    let archivo = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string());

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let mut outcome = ParseOutcome::default();

    let sheet_names = workbook.sheet_names().to_vec();
    for sheet_name in sheet_names {
        let Some(clave) = catalog.resolve(&sheet_name) else {
            outcome
                .alerts
                .push(Alert::ente_no_encontrado(&sheet_name, &archivo));
            continue;
        };

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| IngestError::Sheet(e.to_string()))?;

        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            continue;
        };

        let headers: Vec<String> = header_row.iter().map(|c| normalize_header(c)).collect();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|needed| !headers.iter().any(|h| h == *needed))
            .map(|s| s.to_string())
            .collect();
        if !missing.is_empty() {
            outcome
                .alerts
                .push(Alert::columnas_faltantes(&sheet_name, &archivo, &missing));
            continue;
        }

        let col = |name: &str| headers.iter().position(|h| h == name);
        let idx_rfc = col("RFC").unwrap();
        let idx_nombre = col("NOMBRE").unwrap();
        let idx_puesto = col("PUESTO").unwrap();
        let idx_alta = col("FECHA_ALTA").unwrap();
        let idx_baja = col("FECHA_BAJA").unwrap();
        let idx_monto = col("TOT_PERC");
        let qna_cols: Vec<(usize, QnaNumber)> = headers
            .iter()
            .enumerate()
            .filter_map(|(i, h)| QnaNumber::from_header(h).map(|q| (i, q)))
            .collect();

        for row in rows {
            let Some(rfc_cell) = row.get(idx_rfc) else {
                continue;
            };
            let Some(rfc) = cell_to_string(rfc_cell).and_then(|s| clean_rfc(&s)) else {
                continue;
            };

            let nombre = row
                .get(idx_nombre)
                .and_then(cell_to_string)
                .unwrap_or_default();
            let puesto = row
                .get(idx_puesto)
                .and_then(cell_to_string)
                .unwrap_or_default();
            let fecha_alta = row.get(idx_alta).and_then(clean_date_cell);
            let fecha_baja = row.get(idx_baja).and_then(clean_date_cell);
            let monto = idx_monto
                .and_then(|i| row.get(i))
                .and_then(cell_to_decimal);

            let mut qnas = BTreeSet::new();
            for &(i, q) in &qna_cols {
                let cell_str = row.get(i).and_then(cell_to_string);
                if scil_core::quincena::active(cell_str.as_deref()) {
                    qnas.insert(q);
                }
            }

            outcome.rows.push(SourceRow {
                rfc,
                nombre,
                puesto,
                fecha_alta,
                fecha_baja,
                ente: clave.clone(),
                monto,
                qnas,
            });
        }
    }

    Ok(outcome)
}

fn normalize_header(cell: &Data) -> String {
    cell_to_string(cell)
        .unwrap_or_default()
        .trim()
        .to_uppercase()
        .replace(' ', "_")
}

fn cell_to_string(cell: &Data) -> Option<String> {
    if DataType::is_empty(cell) {
        return None;
    }
    if let Some(s) = DataType::as_string(cell) {
        return Some(s);
    }
    Some(cell.to_string())
}

fn cell_to_decimal(cell: &Data) -> Option<Decimal> {
    if let Some(f) = DataType::get_float(cell) {
        return Decimal::from_str(&f.to_string()).ok();
    }
    cell_to_string(cell).and_then(|s| Decimal::from_str(s.trim()).ok())
}
