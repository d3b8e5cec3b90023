//! C2 — cell-level cleaning rules shared by every column.

use calamine::{Data, DataType};
use chrono::NaiveDate;

/// Uppercase, strip everything outside `[A-Z0-9]`, and keep only results of
/// length `10..=13`. Anything else is dropped (the row carrying it is
/// silently excluded from every finding).
pub fn clean_rfc(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    if (10..=13).contains(&cleaned.len()) {
        Some(cleaned)
    } else {
        None
    }
}

const NULL_TOKENS: &[&str] = &["nan", "nat", "none", "null"];

/// Normalize a spreadsheet date cell to `YYYY-MM-DD`.
///
/// Handles calamine's native date/datetime cell types (the common case for a
/// well-formed workbook), bare Excel serial numbers surfaced as text, and the
/// day-first-preferred string formats spreadsheets commonly carry. Returns
/// `None` on any parse failure or an explicit null token.
pub fn clean_date_cell(cell: &Data) -> Option<String> {
    if DataType::is_empty(cell) {
        return None;
    }
    if let Some(date) = DataType::as_date(cell) {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    if let Some(dt) = DataType::as_datetime(cell) {
        return Some(dt.date().format("%Y-%m-%d").to_string());
    }
    let raw = DataType::as_string(cell).unwrap_or_else(|| cell.to_string());
    clean_date_str(&raw)
}

/// String-only entry point for [`clean_date_cell`], used by tests and by any
/// column that only ever carries text.
pub fn clean_date_str(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if NULL_TOKENS.contains(&trimmed.to_lowercase().as_str()) {
        return None;
    }
    if let Ok(serial) = trimmed.parse::<f64>() {
        return excel_serial_to_iso(serial);
    }
    // Day-first formats are tried before month-first ones so that an
    // ambiguous "03/04/2020" reads as 3 April, not 4 March.
    const FORMATS: &[&str] = &["%d/%m/%Y", "%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%m/%d/%Y"];
    for fmt in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    None
}

fn excel_serial_to_iso(serial: f64) -> Option<String> {
    // Excel's date epoch is 1899-12-30 (it carries the historical 1900
    // leap-year bug forward, so this offset is what actually round-trips).
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(chrono::Duration::days(serial.trunc() as i64))?;
    Some(date.format("%Y-%m-%d").to_string())
}
