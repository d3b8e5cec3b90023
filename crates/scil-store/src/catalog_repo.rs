//! Persistence for the catalog and user seed tables (section 6:
//! `entes`, `municipios`, `usuarios`). Written once at install time, read
//! back on every subsequent startup so the seed workbooks aren't reparsed.

use crate::error::StoreResult;
use scil_core::catalog::Catalog;
use scil_core::model::{Ambito, Entity, User};
use sqlx::{Row, SqlitePool};

async fn save_table(pool: &SqlitePool, table: &str, entities: &[Entity]) -> StoreResult<()> {
    for entity in entities {
        let query = format!(
            "INSERT INTO {table} (clave, nombre, siglas, clasificacion, ambito, activo)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(clave) DO UPDATE SET
                nombre = excluded.nombre,
                siglas = excluded.siglas,
                clasificacion = excluded.clasificacion,
                ambito = excluded.ambito,
                activo = excluded.activo"
        );
        sqlx::query(&query)
            .bind(&entity.clave)
            .bind(&entity.nombre)
            .bind(&entity.siglas)
            .bind(&entity.clasificacion)
            .bind(ambito_str(entity.ambito))
            .bind(entity.activo)
            .execute(pool)
            .await?;
    }
    Ok(())
}

/// Install (or update) the `entes` table.
pub async fn save_entidades_estatales(pool: &SqlitePool, entities: &[Entity]) -> StoreResult<()> {
    save_table(pool, "entes", entities).await
}

/// Install (or update) the `municipios` table.
pub async fn save_municipios(pool: &SqlitePool, entities: &[Entity]) -> StoreResult<()> {
    save_table(pool, "municipios", entities).await
}

/// Install (or update) the `usuarios` table.
pub async fn save_usuarios(pool: &SqlitePool, users: &[User]) -> StoreResult<()> {
    for user in users {
        sqlx::query(
            "INSERT INTO usuarios (usuario, nombre, clave, entes) VALUES (?, ?, ?, ?)
             ON CONFLICT(usuario) DO UPDATE SET
                nombre = excluded.nombre,
                clave = excluded.clave,
                entes = excluded.entes",
        )
        .bind(&user.usuario)
        .bind(&user.nombre)
        .bind(&user.clave)
        .bind(&user.entes)
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn load_table(pool: &SqlitePool, table: &str) -> StoreResult<Vec<Entity>> {
    let query = format!("SELECT clave, nombre, siglas, clasificacion, ambito, activo FROM {table}");
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    Ok(rows
        .into_iter()
        .map(|row| Entity {
            clave: row.get("clave"),
            nombre: row.get("nombre"),
            siglas: row.get("siglas"),
            clasificacion: row.get("clasificacion"),
            ambito: parse_ambito(row.get::<String, _>("ambito").as_str()),
            activo: row.get("activo"),
        })
        .collect())
}

/// Build the catalog (C1) from the persisted `entes` and `municipios` tables.
pub async fn load_catalog(pool: &SqlitePool) -> StoreResult<Catalog> {
    let mut entities = load_table(pool, "entes").await?;
    entities.extend(load_table(pool, "municipios").await?);
    Ok(Catalog::build(entities)?)
}

/// Load every user account.
pub async fn load_usuarios(pool: &SqlitePool) -> StoreResult<Vec<User>> {
    let rows = sqlx::query("SELECT usuario, nombre, clave, entes FROM usuarios")
        .fetch_all(pool)
        .await?;
    Ok(rows
        .into_iter()
        .map(|row| User {
            usuario: row.get("usuario"),
            nombre: row.get("nombre"),
            clave: row.get("clave"),
            entes: row.get("entes"),
        })
        .collect())
}

fn ambito_str(ambito: Ambito) -> &'static str {
    match ambito {
        Ambito::Estatal => "ESTATAL",
        Ambito::Municipal => "MUNICIPAL",
    }
}

fn parse_ambito(s: &str) -> Ambito {
    match s {
        "MUNICIPAL" => Ambito::Municipal,
        _ => Ambito::Estatal,
    }
}
