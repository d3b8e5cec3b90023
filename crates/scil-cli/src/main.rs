//! CLI for the cross-entity payroll incompatibility auditor.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use scil_config::RuntimeConfig;
use scil_core::model::{Ambito, Solventacion};
use scil_store::FindingStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "scil")]
#[command(about = "Cross-entity payroll incompatibility auditor")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose (debug-level) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the persistent store (overrides SCIL_DB)
    #[arg(long, global = true)]
    db: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the entity, municipality, and user seed workbooks into the store
    Install {
        #[arg(long)]
        estatales: PathBuf,
        #[arg(long)]
        municipales: PathBuf,
        #[arg(long)]
        usuarios: PathBuf,
    },

    /// Ingest one or more entity payroll workbooks
    Ingest {
        /// Workbook paths, in the order they should be first-seen
        files: Vec<PathBuf>,

        /// Fiscal year to stamp into fecha_comun (overrides SCIL_FISCAL_YEAR)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Print the merged finding record for one RFC
    ShowRfc { rfc: String },

    /// Upsert a solventación decision for (rfc, ente)
    Solventar {
        rfc: String,
        estado: String,
        comentario: String,
        #[arg(long)]
        ente: Option<String>,
    },

    /// Print the grouped-by-entity audit view
    Grouped {
        /// Comma-separated entity tokens this user may see; TODOS/ALL for full access
        #[arg(long, default_value = "TODOS")]
        user_tokens: String,
    },

    /// Print flattened export rows
    Export {
        /// Substring filter over the raw finding JSON
        #[arg(long)]
        filter: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .init();

    let mut config = RuntimeConfig::from_env().context("loading runtime configuration")?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }

    let store = FindingStore::connect(&config.database_url())
        .await
        .context("connecting to the finding store")?;

    match cli.command {
        Commands::Install { estatales, municipales, usuarios } => {
            run_install(&store, &estatales, &municipales, &usuarios).await
        }
        Commands::Ingest { files, year } => {
            run_ingest(&store, &files, year.unwrap_or(config.fiscal_year)).await
        }
        Commands::ShowRfc { rfc } => run_show_rfc(&store, &rfc).await,
        Commands::Solventar { rfc, estado, comentario, ente } => {
            run_solventar(&store, &rfc, &estado, &comentario, ente.as_deref()).await
        }
        Commands::Grouped { user_tokens } => run_grouped(&store, &user_tokens).await,
        Commands::Export { filter } => run_export(&store, filter.as_deref()).await,
    }
}

async fn run_install(
    store: &FindingStore,
    estatales: &std::path::Path,
    municipales: &std::path::Path,
    usuarios: &std::path::Path,
) -> Result<()> {
    let entes = scil_ingest::load_entities(estatales, "ENTE_", Ambito::Estatal)
        .context("reading Estatales.xlsx")?;
    let munis = scil_ingest::load_entities(municipales, "MUN_", Ambito::Municipal)
        .context("reading Municipales.xlsx")?;
    let users = scil_ingest::load_users(usuarios).context("reading Usuarios_SASP_2025.xlsx")?;

    scil_store::save_entidades_estatales(store.pool(), &entes).await?;
    scil_store::save_municipios(store.pool(), &munis).await?;
    scil_store::save_usuarios(store.pool(), &users).await?;

    tracing::info!(
        entes = entes.len(),
        municipios = munis.len(),
        usuarios = users.len(),
        "catalog installed"
    );
    Ok(())
}

async fn run_ingest(store: &FindingStore, files: &[PathBuf], year: i32) -> Result<()> {
    let catalog = scil_store::load_catalog(store.pool())
        .await
        .context("loading catalog; run `scil install` first")?;

    let mut rows = Vec::new();
    let mut alerts = Vec::new();
    for file in files {
        let outcome = scil_ingest::parse_workbook(file, &catalog)
            .with_context(|| format!("parsing {}", file.display()))?;
        rows.extend(outcome.rows);
        alerts.extend(outcome.alerts);
    }

    let findings = scil_ingest::detect(&rows, year);
    let (inserted, duplicates) = store.save(&findings).await?;

    let summary = serde_json::json!({
        "total": findings.len(),
        "new": inserted,
        "duplicates": duplicates,
        "alerts": alerts,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_show_rfc(store: &FindingStore, rfc: &str) -> Result<()> {
    match store.get_by_rfc(rfc).await? {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("null"),
    }
    Ok(())
}

async fn run_solventar(
    store: &FindingStore,
    rfc: &str,
    estado: &str,
    comentario: &str,
    ente: Option<&str>,
) -> Result<()> {
    let affected = store.update_solventacion(rfc, Some(estado), comentario, ente).await?;
    println!("{{\"rows_affected\": {affected}}}");
    Ok(())
}

async fn run_grouped(store: &FindingStore, user_tokens: &str) -> Result<()> {
    let catalog = scil_store::load_catalog(store.pool()).await?;
    let findings = store.all_findings().await?;
    let solventaciones = solventacion_estado_map(store).await?;
    let tokens: Vec<String> = user_tokens.split(',').map(|t| t.trim().to_string()).collect();

    let grouped = scil_export::grouped_by_entity(&findings, &catalog, &solventaciones, &tokens);
    println!("{}", serde_json::to_string_pretty(&grouped)?);
    Ok(())
}

async fn run_export(store: &FindingStore, filter: Option<&str>) -> Result<()> {
    let catalog = scil_store::load_catalog(store.pool()).await?;
    let (findings, _total) = store.paginated_read(None, filter, 0, i64::MAX).await?;
    let solventaciones = solventacion_full_map(store).await?;

    let rows = scil_export::flatten_export(&findings, &catalog, &solventaciones);
    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}

async fn solventacion_estado_map(store: &FindingStore) -> Result<HashMap<(String, String), String>> {
    let rows: Vec<Solventacion> = store.all_solventaciones().await?;
    Ok(rows.into_iter().map(|s| ((s.rfc, s.ente), s.estado)).collect())
}

async fn solventacion_full_map(
    store: &FindingStore,
) -> Result<HashMap<(String, String), (String, String)>> {
    let rows: Vec<Solventacion> = store.all_solventaciones().await?;
    Ok(rows
        .into_iter()
        .map(|s| ((s.rfc, s.ente), (s.estado, s.comentario)))
        .collect())
}
