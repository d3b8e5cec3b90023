//! The persisted schema (section 6): table names and columns matter for
//! portability, so they're spelled out here rather than behind a migration
//! framework's generated names.

use sqlx::SqlitePool;

const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS entes (
        clave TEXT PRIMARY KEY,
        nombre TEXT NOT NULL,
        siglas TEXT NOT NULL,
        clasificacion TEXT NOT NULL,
        ambito TEXT NOT NULL,
        activo INTEGER NOT NULL DEFAULT 1
    )",
    "CREATE TABLE IF NOT EXISTS municipios (
        clave TEXT PRIMARY KEY,
        nombre TEXT NOT NULL,
        siglas TEXT NOT NULL,
        clasificacion TEXT NOT NULL,
        ambito TEXT NOT NULL,
        activo INTEGER NOT NULL DEFAULT 1
    )",
    "CREATE TABLE IF NOT EXISTS usuarios (
        usuario TEXT PRIMARY KEY,
        nombre TEXT NOT NULL,
        clave TEXT NOT NULL,
        entes TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS laboral (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        tipo_analisis TEXT NOT NULL,
        rfc TEXT NOT NULL,
        datos TEXT NOT NULL,
        hash_firma TEXT NOT NULL UNIQUE
    )",
    "CREATE INDEX IF NOT EXISTS idx_laboral_rfc ON laboral(rfc)",
    "CREATE TABLE IF NOT EXISTS solventaciones (
        rfc TEXT NOT NULL,
        ente TEXT NOT NULL,
        estado TEXT NOT NULL,
        comentario TEXT NOT NULL,
        actualizado TEXT NOT NULL,
        UNIQUE(rfc, ente)
    )",
];

/// Create every table and index if it doesn't already exist. Idempotent;
/// safe to call on every startup.
pub async fn apply(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    for statement in STATEMENTS {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
