//! C1 — the immutable catalog of entities and municipalities.
//!
//! Built once at install time from two seed tables and held as a plain
//! value thereafter; there is no hidden global registry. Every lookup is
//! case- and accent-insensitive so that a sheet title, a row's `NOMBRE`
//! cell, and a catalog cross-reference all resolve to the same `clave`.

use crate::error::{CoreError, CoreResult};
use crate::model::{Entity, ALL, TODOS};
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Case- and accent-insensitive registry of entities and municipalities.
#[derive(Debug, Clone)]
pub struct Catalog {
    /// normalized alias (clave, nombre, or siglas) -> canonical clave
    aliases: HashMap<String, String>,
    /// canonical clave -> entity record
    entities: HashMap<String, Entity>,
}

impl Catalog {
    /// Build the catalog from the union of the `entes` and `municipios`
    /// seed tables. Errors if two entries share a `clave`.
    pub fn build(entries: impl IntoIterator<Item = Entity>) -> CoreResult<Self> {
        let mut entities = HashMap::new();
        let mut aliases = HashMap::new();

        for entity in entries {
            if entities.contains_key(&entity.clave) {
                return Err(CoreError::DuplicateClave(entity.clave));
            }
            for alias in [&entity.clave, &entity.nombre, &entity.siglas] {
                let key = normalize(alias);
                if !key.is_empty() {
                    aliases.entry(key).or_insert_with(|| entity.clave.clone());
                }
            }
            entities.insert(entity.clave.clone(), entity);
        }

        Ok(Self { aliases, entities })
    }

    /// Resolve a sheet label, row cell, or clave to its canonical `clave`.
    pub fn resolve(&self, label: &str) -> Option<String> {
        self.aliases.get(&normalize(label)).cloned()
    }

    /// Siglas if non-empty, else nombre, else the clave itself.
    pub fn display(&self, clave: &str) -> String {
        match self.entities.get(clave) {
            Some(entity) => entity.display_label().to_string(),
            None => clave.to_string(),
        }
    }

    /// Look up the full entry behind a canonical clave.
    pub fn entity(&self, clave: &str) -> Option<&Entity> {
        self.entities.get(clave)
    }

    /// True if `user_token` and `row_label` name the same entity: either they
    /// resolve to the same clave, or one normalized string contains the
    /// other. The containment fallback covers users whose assignment list
    /// carries a partial/legacy name not in the catalog.
    pub fn matches(&self, user_token: &str, row_label: &str) -> bool {
        let a = normalize(user_token);
        let b = normalize(row_label);
        if a.is_empty() || b.is_empty() {
            return false;
        }
        match (self.resolve(&a), self.resolve(&b)) {
            (Some(ca), Some(cb)) if ca == cb => return true,
            _ => {}
        }
        a.contains(&b) || b.contains(&a)
    }

    /// True if any token in the list is the `TODOS`/`ALL` full-access
    /// sentinel, compared case- and accent-insensitively.
    pub fn has_full_access(&self, user_tokens: &[String]) -> bool {
        user_tokens.iter().any(|t| {
            let n = normalize(t);
            n == normalize(TODOS) || n == normalize(ALL)
        })
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Uppercase, accent-strip, and collapse whitespace for alias comparison.
pub fn normalize(s: &str) -> String {
    let stripped: String = s.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .to_uppercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}
