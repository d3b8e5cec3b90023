//! Error types for workbook ingestion.

use thiserror::Error;

/// Errors that abort ingestion of an entire workbook.
///
/// Per-sheet and per-row problems are never fatal: they are reported as
/// [`crate::alert::Alert`]s alongside whatever rows did parse successfully.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("failed to open workbook: {0}")]
    Open(#[from] calamine::XlsxError),

    #[error("failed to read sheet: {0}")]
    Sheet(String),
}

pub type IngestResult<T> = Result<T, IngestError>;
