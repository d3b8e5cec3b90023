//! The biweekly pay period ("quincena") index and its activity predicate.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A quincena index within a fiscal year, `1..=24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QnaNumber(u8);

impl QnaNumber {
    /// Build a `QnaNumber`, rejecting anything outside `1..=24`.
    pub fn new(n: u8) -> CoreResult<Self> {
        if (1..=24).contains(&n) {
            Ok(Self(n))
        } else {
            Err(CoreError::InvalidQuincena(n))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Parse a column header like `QNA3` or `QNA24` into its number.
    ///
    /// Returns `None` for headers outside the `QNA1..QNA24` family, including
    /// out-of-range indices such as `QNA25`.
    pub fn from_header(header: &str) -> Option<Self> {
        let rest = header.strip_prefix("QNA")?;
        let n: u8 = rest.parse().ok()?;
        Self::new(n).ok()
    }

    /// `"{year}Q{NN}"` with a zero-padded two digit quincena number.
    ///
    /// This is the normative `fecha_comun` form; some legacy data carries the
    /// unpadded `"{year}Q{N}"` variant, which this implementation never emits.
    pub fn fecha_comun(self, year: i32) -> String {
        format!("{year}Q{:02}", self.0)
    }
}

impl fmt::Display for QnaNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QNA{}", self.0)
    }
}

/// Cell values that never indicate an active pay period, regardless of case.
const INACTIVE_TOKENS: &[&str] = &["", "0", "0.0", "NO", "N/A", "NA", "NONE"];

/// The quincena activity predicate: is this cell value a real payment marker?
///
/// A cell is active iff it is present, its trimmed uppercase form is not one
/// of the known null/negative tokens, and it is not a numeric value equal to
/// zero (covers `"0.00"`, `"0,0"`, and similar spreadsheet renderings of
/// "no payment").
pub fn active(cell: Option<&str>) -> bool {
    let Some(raw) = cell else {
        return false;
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return false;
    }
    let upper = trimmed.to_uppercase();
    if INACTIVE_TOKENS.contains(&upper.as_str()) {
        return false;
    }
    if let Ok(n) = upper.replace(',', "").parse::<f64>() {
        if n == 0.0 {
            return false;
        }
    }
    true
}

/// `^QNA([1-9]|1[0-9]|2[0-4])$` — recognizes headers `QNA1` through `QNA24`.
pub fn is_qna_header(header: &str) -> bool {
    QnaNumber::from_header(header).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_predicate_boundary_cases() {
        assert!(!active(Some("")));
        assert!(!active(Some("0")));
        assert!(!active(Some("0.0")));
        assert!(!active(Some("NO")));
        assert!(!active(Some("N/A")));
        assert!(!active(None));
        assert!(active(Some("SI")));
        assert!(active(Some("1")));
        assert!(active(Some("100.50")));
    }

    #[test]
    fn qna_header_parsing_accepts_1_through_24_only() {
        assert_eq!(QnaNumber::from_header("QNA1").unwrap().get(), 1);
        assert_eq!(QnaNumber::from_header("QNA24").unwrap().get(), 24);
        assert!(QnaNumber::from_header("QNA0").is_none());
        assert!(QnaNumber::from_header("QNA25").is_none());
        assert!(QnaNumber::from_header("QNAX").is_none());
        assert!(QnaNumber::from_header("TOT_PERC").is_none());
    }

    #[test]
    fn fecha_comun_is_zero_padded() {
        assert_eq!(QnaNumber::new(3).unwrap().fecha_comun(2026), "2026Q03");
        assert_eq!(QnaNumber::new(24).unwrap().fecha_comun(2026), "2026Q24");
    }
}
