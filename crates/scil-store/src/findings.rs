//! C4 — content-addressed persistence of findings plus per-(RFC,entity)
//! solventación upserts.
//!
//! The uniqueness constraint on `laboral.hash_firma` is the only
//! synchronization this store relies on: a hash collision on insert is
//! caught and treated as "already present" rather than propagated.

use crate::error::{StoreError, StoreResult};
use crate::hash::hash_firma;
use crate::merged::MergedRecord;
use crate::schema;
use chrono::Utc;
use scil_core::model::{estatus_label, fuse, Estado, Finding, Solventacion, TipoPatron, GENERAL, SIN_VALORACION};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::collections::{BTreeSet, HashMap};

/// A `(estado, comentario)` pair as read back for one entity's solventación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolventacionView {
    pub estado: String,
    pub comentario: String,
}

/// The finding and solventación store (C4).
pub struct FindingStore {
    pool: SqlitePool,
}

impl FindingStore {
    /// Open (creating if absent) the SQLite database at `database_url` and
    /// apply the schema. `database_url` is an `sqlx` connection string, e.g.
    /// `sqlite://scil.db?mode=rwc` or `sqlite::memory:`.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        schema::apply(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an already-connected, already-migrated pool. Used by tests that
    /// need a single shared in-memory connection.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Partition `findings` against the hashes already on record. No writes.
    pub async fn compare_with_history(
        &self,
        findings: &[Finding],
    ) -> StoreResult<(Vec<Finding>, Vec<Finding>, usize)> {
        let mut new = Vec::new();
        let mut repeated = Vec::new();
        for finding in findings {
            let h = hash_firma(finding);
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM laboral WHERE hash_firma = ?")
                .bind(&h)
                .fetch_optional(&self.pool)
                .await?;
            if exists.is_some() {
                repeated.push(finding.clone());
            } else {
                new.push(finding.clone());
            }
        }
        let repeated_count = repeated.len();
        Ok((new, repeated, repeated_count))
    }

    /// Insert every finding not already present by hash. Idempotent: a
    /// uniqueness violation on `hash_firma` is swallowed, not propagated.
    pub async fn save(&self, findings: &[Finding]) -> StoreResult<(usize, usize)> {
        let mut inserted = 0usize;
        let mut duplicates = 0usize;
        for finding in findings {
            let h = hash_firma(finding);
            let datos = serde_json::to_string(finding).expect("Finding always serializes");
            let tipo = tipo_analisis_str(finding.tipo_patron);
            let result = sqlx::query(
                "INSERT INTO laboral (tipo_analisis, rfc, datos, hash_firma) VALUES (?, ?, ?, ?)
                 ON CONFLICT(hash_firma) DO NOTHING",
            )
            .bind(tipo)
            .bind(&finding.rfc)
            .bind(&datos)
            .bind(&h)
            .execute(&self.pool)
            .await?;
            if result.rows_affected() > 0 {
                inserted += 1;
            } else {
                duplicates += 1;
            }
        }
        Ok((inserted, duplicates))
    }

    /// Merge every finding for `rfc` into one view, fusing per-entity estado.
    pub async fn get_by_rfc(&self, rfc: &str) -> StoreResult<Option<MergedRecord>> {
        let rows = sqlx::query("SELECT id, datos FROM laboral WHERE rfc = ? ORDER BY id ASC")
            .bind(rfc)
            .fetch_all(&self.pool)
            .await?;
        if rows.is_empty() {
            return Ok(None);
        }

        let mut findings = Vec::with_capacity(rows.len());
        for row in &rows {
            findings.push(decode_finding(row)?);
        }

        let mut nombre = String::new();
        let mut entes: BTreeSet<String> = BTreeSet::new();
        let mut dedup_seen = std::collections::HashSet::new();
        let mut registros = Vec::new();
        let mut last_estado_by_ente: HashMap<String, String> = HashMap::new();
        let mut last_solventacion = String::new();

        for finding in &findings {
            if !finding.nombre.trim().is_empty() {
                nombre = finding.nombre.clone();
            }
            entes.extend(finding.entes.iter().cloned());
            for ente in &finding.entes {
                last_estado_by_ente.insert(ente.clone(), finding.estado.clone());
            }
            if !finding.solventacion.trim().is_empty() {
                last_solventacion = finding.solventacion.clone();
            }
            for row in &finding.registros {
                if dedup_seen.insert(row.dedup_key()) {
                    registros.push(row.clone());
                }
            }
        }

        let sol_map = self.get_solventaciones_by_rfc(rfc).await?;
        let fused = fuse(entes.iter().map(|ente| {
            if let Some(sol) = sol_map.get(ente) {
                estatus_label(&sol.estado)
            } else if let Some(estado) = last_estado_by_ente.get(ente) {
                estatus_label(estado)
            } else {
                Estado::Unvalued
            }
        }));

        Ok(Some(MergedRecord {
            rfc: rfc.to_string(),
            nombre,
            entes,
            registros,
            estado: fused.to_string(),
            solventacion: last_solventacion,
        }))
    }

    /// Decoded findings sorted by descending insertion id, `filter`-matched
    /// as a substring LIKE over the raw JSON payload, optionally restricted
    /// to one `tipo_patron`.
    pub async fn paginated_read(
        &self,
        kind: Option<TipoPatron>,
        filter: Option<&str>,
        page: i64,
        limit: i64,
    ) -> StoreResult<(Vec<Finding>, i64)> {
        let offset = page.max(0) * limit.max(0);
        let like = filter.map(|f| format!("%{f}%"));
        let kind_str = kind.map(tipo_analisis_str);

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM laboral
             WHERE (?1 IS NULL OR tipo_analisis = ?1)
               AND (?2 IS NULL OR datos LIKE ?2)",
        )
        .bind(&kind_str)
        .bind(&like)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query(
            "SELECT id, datos FROM laboral
             WHERE (?1 IS NULL OR tipo_analisis = ?1)
               AND (?2 IS NULL OR datos LIKE ?2)
             ORDER BY id DESC
             LIMIT ?3 OFFSET ?4",
        )
        .bind(&kind_str)
        .bind(&like)
        .bind(limit.max(0))
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let mut findings = Vec::with_capacity(rows.len());
        for row in &rows {
            findings.push(decode_finding(row)?);
        }
        Ok((findings, total))
    }

    /// Every recorded solventación for `rfc`, keyed by entity clave (or the
    /// `GENERAL` sentinel).
    pub async fn get_solventaciones_by_rfc(
        &self,
        rfc: &str,
    ) -> StoreResult<HashMap<String, SolventacionView>> {
        let rows = sqlx::query("SELECT ente, estado, comentario FROM solventaciones WHERE rfc = ?")
            .bind(rfc)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let ente: String = row.get("ente");
                let view = SolventacionView {
                    estado: row.get("estado"),
                    comentario: row.get("comentario"),
                };
                (ente, view)
            })
            .collect())
    }

    /// Upsert the solventación for `(rfc, ente)`. `ente` defaults to
    /// `GENERAL` and `estado` to `SIN_VALORACION` when empty/absent.
    pub async fn update_solventacion(
        &self,
        rfc: &str,
        estado: Option<&str>,
        comentario: &str,
        ente: Option<&str>,
    ) -> StoreResult<u64> {
        let ente = non_empty(ente).unwrap_or(GENERAL);
        let estado = non_empty(estado).unwrap_or(SIN_VALORACION);
        let actualizado = Utc::now();

        let result = sqlx::query(
            "INSERT INTO solventaciones (rfc, ente, estado, comentario, actualizado)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(rfc, ente) DO UPDATE SET
                estado = excluded.estado,
                comentario = excluded.comentario,
                actualizado = excluded.actualizado",
        )
        .bind(rfc)
        .bind(ente)
        .bind(estado)
        .bind(comentario)
        .bind(actualizado.to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// The most recently recorded estado for `(rfc, clave)`, if any.
    ///
    /// The `(rfc, ente)` uniqueness constraint means there is at most one
    /// row per pair; "most recently updated" is automatically satisfied.
    pub async fn get_estado(&self, rfc: &str, clave: &str) -> StoreResult<Option<String>> {
        let estado: Option<String> =
            sqlx::query_scalar("SELECT estado FROM solventaciones WHERE rfc = ? AND ente = ?")
                .bind(rfc)
                .bind(clave)
                .fetch_optional(&self.pool)
                .await?;
        Ok(estado)
    }

    /// Read back every solventación row. Exposed for the exporter, which
    /// needs the full table rather than one RFC at a time.
    pub async fn all_solventaciones(&self) -> StoreResult<Vec<Solventacion>> {
        let rows = sqlx::query("SELECT rfc, ente, estado, comentario, actualizado FROM solventaciones")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                let actualizado_raw: String = row.get("actualizado");
                let actualizado = chrono::DateTime::parse_from_rfc3339(&actualizado_raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());
                Ok(Solventacion {
                    rfc: row.get("rfc"),
                    ente: row.get("ente"),
                    estado: row.get("estado"),
                    comentario: row.get("comentario"),
                    actualizado,
                })
            })
            .collect()
    }

    /// Read back every persisted finding, in insertion order. Exposed for
    /// the exporter's `grouped_by_entity` and `flatten_export`.
    pub async fn all_findings(&self) -> StoreResult<Vec<Finding>> {
        let rows = sqlx::query("SELECT id, datos FROM laboral ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(decode_finding).collect()
    }
}

fn decode_finding(row: &SqliteRow) -> StoreResult<Finding> {
    let id: i64 = row.get("id");
    let datos: String = row.get("datos");
    serde_json::from_str(&datos).map_err(|source| StoreError::CorruptRecord { id, source })
}

fn tipo_analisis_str(tipo: TipoPatron) -> &'static str {
    match tipo {
        TipoPatron::CruceEntreEntesQna => "CRUCE_ENTRE_ENTES_QNA",
        TipoPatron::SinDuplicidad => "SIN_DUPLICIDAD",
    }
}

fn non_empty(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scil_core::model::TipoPatron;
    use std::collections::BTreeSet;

    async fn store() -> FindingStore {
        FindingStore::connect("sqlite::memory:").await.unwrap()
    }

    fn cruce(rfc: &str, entes: &[&str], fecha_comun: &str) -> Finding {
        Finding::cruce(
            rfc.to_string(),
            "Juan Perez".to_string(),
            entes.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            fecha_comun.to_string(),
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn save_then_resave_is_idempotent() {
        let store = store().await;
        let f = cruce("CUPU800825569", &["ENTE_00002", "ENTE_00003"], "2026Q03");

        let (inserted, duplicates) = store.save(&[f.clone()]).await.unwrap();
        assert_eq!((inserted, duplicates), (1, 0));

        let (inserted, duplicates) = store.save(&[f]).await.unwrap();
        assert_eq!((inserted, duplicates), (0, 1));
    }

    #[tokio::test]
    async fn compare_with_history_does_not_write() {
        let store = store().await;
        let f = cruce("CUPU800825569", &["ENTE_00002", "ENTE_00003"], "2026Q03");
        store.save(&[f.clone()]).await.unwrap();

        let (new, repeated, count) = store.compare_with_history(&[f]).await.unwrap();
        assert!(new.is_empty());
        assert_eq!(repeated.len(), 1);
        assert_eq!(count, 1);

        // Still exactly one row: compare_with_history performed no writes.
        let (_, total) = store.paginated_read(None, None, 0, 10).await.unwrap();
        assert_eq!(total, 1);
    }

    #[tokio::test]
    async fn update_solventacion_then_get_estado_round_trips() {
        let store = store().await;
        let affected = store
            .update_solventacion("CUPU800825569", Some("Solventado"), "ok", Some("ENTE_00002"))
            .await
            .unwrap();
        assert_eq!(affected, 1);
        let estado = store.get_estado("CUPU800825569", "ENTE_00002").await.unwrap();
        assert_eq!(estado.as_deref(), Some("Solventado"));
    }

    #[tokio::test]
    async fn update_solventacion_defaults_ente_and_estado() {
        let store = store().await;
        store
            .update_solventacion("CUPU800825569", None, "sin detalle", None)
            .await
            .unwrap();
        let estado = store.get_estado("CUPU800825569", GENERAL).await.unwrap();
        assert_eq!(estado.as_deref(), Some(SIN_VALORACION));
    }

    #[tokio::test]
    async fn get_by_rfc_fuses_mixed_solventaciones_into_mixto() {
        let store = store().await;
        let f = cruce("CUPU800825569", &["ENTE_00002", "ENTE_00003"], "2026Q03");
        store.save(&[f]).await.unwrap();

        store
            .update_solventacion("CUPU800825569", Some("Solventado"), "ok", Some("ENTE_00002"))
            .await
            .unwrap();

        let merged = store.get_by_rfc("CUPU800825569").await.unwrap().unwrap();
        assert_eq!(merged.estado, "Mixto");
        assert_eq!(
            merged.entes,
            ["ENTE_00002", "ENTE_00003"].into_iter().map(String::from).collect()
        );
    }

    #[tokio::test]
    async fn get_by_rfc_returns_none_when_absent() {
        let store = store().await;
        assert!(store.get_by_rfc("NOEXISTE0000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn paginated_read_filters_by_kind_and_substring() {
        let store = store().await;
        let cruce_f = cruce("CUPU800825569", &["ENTE_00002", "ENTE_00003"], "2026Q03");
        let sin_dup = Finding::sin_duplicidad(
            "OTRO800825569".to_string(),
            "Ana Lopez".to_string(),
            ["ENTE_00004"].into_iter().map(String::from).collect(),
            Vec::new(),
        );
        store.save(&[cruce_f, sin_dup]).await.unwrap();

        let (rows, total) = store
            .paginated_read(Some(TipoPatron::SinDuplicidad), None, 0, 10)
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].rfc, "OTRO800825569");

        let (rows, total) = store.paginated_read(None, Some("CUPU8008"), 0, 10).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(rows[0].rfc, "CUPU800825569");
    }
}
