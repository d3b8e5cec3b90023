//! Authenticated users and their entity-scoped visibility.

use serde::{Deserialize, Serialize};

/// Token recognized as "no entity restriction" in a user's `entes` list.
pub const TODOS: &str = "TODOS";
/// English-language alias for [`TODOS`], also recognized.
pub const ALL: &str = "ALL";

/// A loaded user account. Accounts are installed once from a seed
/// spreadsheet and are read-only at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Lowercased, unique.
    pub usuario: String,
    pub nombre: String,
    /// SHA-256 hex digest of the plaintext password.
    pub clave: String,
    /// Comma-separated entity tokens, or the sentinel `TODOS`/`ALL`.
    pub entes: String,
}

impl User {
    /// Split `entes` into its individual tokens, trimmed of whitespace.
    pub fn ente_tokens(&self) -> Vec<String> {
        self.entes
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}
