//! The auditor resolution state, free-text in storage but a closed sum type
//! wherever the system needs to reason about it.

use std::fmt;

/// Literal storage form of the "not yet valued" state.
pub const SIN_VALORACION: &str = "Sin valoración";
/// Literal storage form of the "resolved" state.
pub const SOLVENTADO: &str = "Solventado";
/// Literal storage form of the "unresolved" state.
pub const NO_SOLVENTADO: &str = "No Solventado";
/// Literal storage form of the read-time-only "mixed" state.
pub const MIXTO: &str = "Mixto";

/// The closed set of meanings free-text `estado` values carry.
///
/// `Mixto` is never written to storage; it is synthesized at read time when
/// different `(rfc, ente)` pairs disagree for the same RFC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Estado {
    Unvalued,
    Solventado,
    NoSolventado,
    Mixto,
}

impl fmt::Display for Estado {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Estado::Unvalued => SIN_VALORACION,
            Estado::Solventado => SOLVENTADO,
            Estado::NoSolventado => NO_SOLVENTADO,
            Estado::Mixto => MIXTO,
        };
        f.write_str(s)
    }
}

/// Parse a free-text legacy estado into its closed-set meaning.
///
/// Exact contract: lowercase and trim, then `contains("no")` wins over
/// `contains("solvent")`, else the value is unvalued. This ordering is load
/// bearing — "no solventado" contains both substrings and must resolve to
/// `NoSolventado`.
pub fn estatus_label(raw: &str) -> Estado {
    let normalized = raw.trim().to_lowercase();
    if normalized.contains("no") {
        Estado::NoSolventado
    } else if normalized.contains("solvent") {
        Estado::Solventado
    } else {
        Estado::Unvalued
    }
}

/// Fuse the effective estados of every entity a finding touches: unanimous
/// agreement passes through, any disagreement synthesizes `Mixto`. An empty
/// iterator fuses to `Unvalued`.
pub fn fuse(mut estados: impl Iterator<Item = Estado>) -> Estado {
    let Some(first) = estados.next() else {
        return Estado::Unvalued;
    };
    if estados.all(|e| e == first) {
        first
    } else {
        Estado::Mixto
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_wins_over_solvent() {
        assert_eq!(estatus_label("No Solventado"), Estado::NoSolventado);
        assert_eq!(estatus_label("  no solventado  "), Estado::NoSolventado);
    }

    #[test]
    fn solvent_without_no() {
        assert_eq!(estatus_label("Solventado"), Estado::Solventado);
        assert_eq!(estatus_label("SOLVENTADO"), Estado::Solventado);
    }

    #[test]
    fn anything_else_is_unvalued() {
        assert_eq!(estatus_label("Sin valoración"), Estado::Unvalued);
        assert_eq!(estatus_label(""), Estado::Unvalued);
        assert_eq!(estatus_label("pendiente"), Estado::Unvalued);
    }

    #[test]
    fn fuse_unanimous_passes_through() {
        let estados = [Estado::Solventado, Estado::Solventado];
        assert_eq!(fuse(estados.into_iter()), Estado::Solventado);
    }

    #[test]
    fn fuse_disagreement_is_mixto() {
        let estados = [Estado::Solventado, Estado::Unvalued];
        assert_eq!(fuse(estados.into_iter()), Estado::Mixto);
    }
}
