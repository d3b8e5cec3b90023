//! Runtime configuration schema (section 6: "these govern the runtime host,
//! not the core algorithms").

use crate::error::{ConfigError, ConfigResult};
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

fn default_db_path() -> PathBuf {
    PathBuf::from("scil.db")
}

fn default_port() -> u16 {
    4050
}

fn default_fiscal_year() -> i32 {
    chrono::Utc::now().year()
}

/// Paths to the three seed spreadsheets read once at install time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPaths {
    #[serde(default = "default_estatales_path")]
    pub estatales: PathBuf,
    #[serde(default = "default_municipales_path")]
    pub municipales: PathBuf,
    #[serde(default = "default_usuarios_path")]
    pub usuarios: PathBuf,
}

fn default_estatales_path() -> PathBuf {
    PathBuf::from("seed/Estatales.xlsx")
}

fn default_municipales_path() -> PathBuf {
    PathBuf::from("seed/Municipales.xlsx")
}

fn default_usuarios_path() -> PathBuf {
    PathBuf::from("seed/Usuarios_SASP_2025.xlsx")
}

impl Default for SeedPaths {
    fn default() -> Self {
        Self {
            estatales: default_estatales_path(),
            municipales: default_municipales_path(),
            usuarios: default_usuarios_path(),
        }
    }
}

/// The runtime host's configuration: where the store lives, what port to
/// bind, and which fiscal year's QNAs an ingest call stamps findings with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Path to the persistent store (`SCIL_DB`, default `scil.db`).
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    /// Network port the HTTP boundary binds to (`PORT`, default 4050).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Fiscal year stamped into `fecha_comun` by the detector
    /// (`SCIL_FISCAL_YEAR`, default the current calendar year).
    #[serde(default = "default_fiscal_year")]
    pub fiscal_year: i32,
    #[serde(default)]
    pub seed_paths: SeedPaths,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            port: default_port(),
            fiscal_year: default_fiscal_year(),
            seed_paths: SeedPaths::default(),
        }
    }
}

impl RuntimeConfig {
    /// Read configuration from the environment, falling back to defaults.
    /// Unset variables are not an error; malformed ones are.
    pub fn from_env() -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Ok(v) = env::var("SCIL_DB") {
            config.db_path = PathBuf::from(v);
        }
        if let Ok(v) = env::var("PORT") {
            config.port = v.parse().map_err(|_| ConfigError::InvalidEnvVar {
                var: "PORT",
                value: v,
                reason: "must be a u16".to_string(),
            })?;
        }
        if let Ok(v) = env::var("SCIL_FISCAL_YEAR") {
            config.fiscal_year = v.parse().map_err(|_| ConfigError::InvalidEnvVar {
                var: "SCIL_FISCAL_YEAR",
                value: v,
                reason: "must be an integer year".to_string(),
            })?;
        }
        if let Ok(v) = env::var("SCIL_SEED_ESTATALES") {
            config.seed_paths.estatales = PathBuf::from(v);
        }
        if let Ok(v) = env::var("SCIL_SEED_MUNICIPALES") {
            config.seed_paths.municipales = PathBuf::from(v);
        }
        if let Ok(v) = env::var("SCIL_SEED_USUARIOS") {
            config.seed_paths.usuarios = PathBuf::from(v);
        }

        crate::validation::validate(&config)?;
        Ok(config)
    }

    /// `sqlx` connection string for [`RuntimeConfig::db_path`].
    pub fn database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.db_path.display())
    }
}
