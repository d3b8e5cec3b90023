//! Loading the catalog and user accounts from their seed workbooks
//! (section 6). Run once at install time; the resulting values are held
//! read-only thereafter — there is no reload path.

use crate::error::{IngestError, IngestResult};
use calamine::{open_workbook, Data, DataType, Reader, Xlsx};
use scil_core::model::{Ambito, Entity, User};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Load `Estatales.xlsx` or `Municipales.xlsx`: `NUM, NOMBRE, SIGLAS,
/// CLASIFICACION`. `clave_prefix` is `"ENTE_"` or `"MUN_"`; `ambito` is
/// stamped onto every row from this sheet.
pub fn load_entities(path: &Path, clave_prefix: &str, ambito: Ambito) -> IngestResult<Vec<Entity>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::Sheet("seed workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Sheet(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|c| cell_to_string(c).unwrap_or_default().trim().to_uppercase()).collect();
    let col = |name: &str| headers.iter().position(|h| h == name);
    let idx_num = col("NUM").ok_or_else(|| IngestError::Sheet("missing NUM column".to_string()))?;
    let idx_nombre = col("NOMBRE").ok_or_else(|| IngestError::Sheet("missing NOMBRE column".to_string()))?;
    let idx_siglas = col("SIGLAS").ok_or_else(|| IngestError::Sheet("missing SIGLAS column".to_string()))?;
    let idx_clasificacion = col("CLASIFICACION");

    let mut entities = Vec::new();
    for row in rows {
        let Some(num) = row.get(idx_num).and_then(cell_to_string) else {
            continue;
        };
        if num.trim().is_empty() {
            continue;
        }
        let clave = format!("{clave_prefix}{}", clave_to_suffix(&num));
        let nombre = row.get(idx_nombre).and_then(cell_to_string).unwrap_or_default();
        let siglas = row.get(idx_siglas).and_then(cell_to_string).unwrap_or_default();
        let clasificacion = idx_clasificacion
            .and_then(|i| row.get(i))
            .and_then(cell_to_string)
            .unwrap_or_default();

        entities.push(Entity {
            clave,
            nombre,
            siglas,
            clasificacion,
            ambito,
            activo: true,
        });
    }
    Ok(entities)
}

/// Load `Usuarios_SASP_2025.xlsx`: `Usuario, Clave, Nombre completo, Entes
/// asignados`. `Clave` is hashed here with SHA-256; the seed file carries
/// the plaintext password.
pub fn load_users(path: &Path) -> IngestResult<Vec<User>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::Sheet("seed workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Sheet(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header_row.iter().map(|c| cell_to_string(c).unwrap_or_default().trim().to_uppercase()).collect();
    let col = |name: &str| headers.iter().position(|h| h == name);
    let idx_usuario = col("USUARIO").ok_or_else(|| IngestError::Sheet("missing Usuario column".to_string()))?;
    let idx_clave = col("CLAVE").ok_or_else(|| IngestError::Sheet("missing Clave column".to_string()))?;
    let idx_nombre = col("NOMBRE COMPLETO").ok_or_else(|| IngestError::Sheet("missing Nombre completo column".to_string()))?;
    let idx_entes = col("ENTES ASIGNADOS").ok_or_else(|| IngestError::Sheet("missing Entes asignados column".to_string()))?;

    let mut users = Vec::new();
    for row in rows {
        let Some(usuario) = row.get(idx_usuario).and_then(cell_to_string) else {
            continue;
        };
        if usuario.trim().is_empty() {
            continue;
        }
        let plaintext = row.get(idx_clave).and_then(cell_to_string).unwrap_or_default();
        let nombre = row.get(idx_nombre).and_then(cell_to_string).unwrap_or_default();
        let entes = row.get(idx_entes).and_then(cell_to_string).unwrap_or_default();

        users.push(User {
            usuario: usuario.trim().to_lowercase(),
            nombre,
            clave: hash_password(&plaintext),
            entes,
        });
    }
    Ok(users)
}

fn hash_password(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex::encode(hasher.finalize())
}

/// `NUM` to clave suffix: strip a trailing `.`, replace remaining `.` with
/// `_` (e.g. `"3."` -> `"3"`, `"1.2"` -> `"1_2"`).
fn clave_to_suffix(num: &str) -> String {
    num.trim().trim_end_matches('.').replace('.', "_")
}

fn cell_to_string(cell: &Data) -> Option<String> {
    if DataType::is_empty(cell) {
        return None;
    }
    if let Some(s) = DataType::as_string(cell) {
        return Some(s);
    }
    Some(cell.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clave_suffix_strips_trailing_dot_and_collapses_inner_dots() {
        assert_eq!(clave_to_suffix("3."), "3");
        assert_eq!(clave_to_suffix("1.2"), "1_2");
        assert_eq!(clave_to_suffix("123"), "123");
    }

    #[test]
    fn password_hash_is_sha256_hex() {
        let hash = hash_password("hunter2");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
