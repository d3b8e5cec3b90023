//! Content-addressing: a finding's `hash_firma` is the SHA-256 digest of its
//! canonical JSON serialization, keys sorted recursively so that two
//! semantically identical findings from different ingests always collide.

use scil_core::model::Finding;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// The fields that participate in content addressing, excluding `estado`,
/// `solventacion`, and `hash_firma` itself: those are mutable audit state,
/// not part of the finding's identity.
pub fn canonical_json(finding: &Finding) -> String {
    let mut identity = finding.clone();
    identity.estado = String::new();
    identity.solventacion = String::new();
    identity.hash_firma = None;

    let value = serde_json::to_value(&identity).expect("Finding always serializes");
    let sorted = sort_json_value(value);
    serde_json::to_string(&sorted).expect("sorted Value always serializes")
}

/// Recursively sort object keys so serialization order never varies.
fn sort_json_value(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;

    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_json_value(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(arr) => Value::Array(arr.into_iter().map(sort_json_value).collect()),
        other => other,
    }
}

/// SHA-256 hex digest of a finding's canonical JSON.
pub fn hash_firma(finding: &Finding) -> String {
    let canonical = canonical_json(finding);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
