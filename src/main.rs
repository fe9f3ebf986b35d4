// ==========================================
// Asset Import Engine - Command Line Entry
// ==========================================
// asset-import preview <FILE> --kind telecom_asset
// asset-import execute <FILE>... --kind it_asset [--db path]
// The ImportReport is printed to stdout as pretty JSON; logs go to stderr.
// ==========================================

use anyhow::Context;
use asset_import::config::{ConfigManager, FieldCatalog, ImportConfig, ImportConfigReader};
use asset_import::domain::{AssetKind, ImportReport};
use asset_import::importer::{AssetImporter, AssetImporterImpl};
use asset_import::logging;
use asset_import::repository::SqliteRecordStore;
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "asset-import",
    version,
    about = "Import asset spreadsheets into the asset register"
)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a file without writing anything
    Preview {
        file: PathBuf,
        #[command(flatten)]
        opts: ImportOpts,
    },
    /// Import every row of one or more files
    Execute {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        opts: ImportOpts,
    },
    /// Print the built-in field synonym catalog as JSON
    Catalog,
}

#[derive(Args, Debug)]
struct ImportOpts {
    /// Asset kind: it_asset or telecom_asset
    #[arg(long, short = 'k', value_parser = parse_kind)]
    kind: AssetKind,

    /// SQLite database (default: ASSET_IMPORT_DB_PATH or the user data dir)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Import settings as JSON (overrides stored in the database still apply)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field synonym catalog as JSON (default: built-in)
    #[arg(long)]
    catalog: Option<PathBuf>,
}

fn parse_kind(s: &str) -> Result<AssetKind, String> {
    s.parse::<AssetKind>()
}

/// DB path: ASSET_IMPORT_DB_PATH, else <data_dir>/asset-import/asset_import.db
fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("ASSET_IMPORT_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::data_dir() {
        Some(data_dir) => {
            let dir = data_dir.join("asset-import");
            std::fs::create_dir_all(&dir).ok();
            dir.join("asset_import.db")
        }
        None => PathBuf::from("./asset_import.db"),
    }
}

async fn build_importer(
    opts: &ImportOpts,
) -> anyhow::Result<AssetImporterImpl<SqliteRecordStore>> {
    let db_path = opts.db.clone().unwrap_or_else(default_db_path);
    let db_path = db_path.to_string_lossy().to_string();
    tracing::info!(db = %db_path, "using database");

    let base = match &opts.config {
        Some(path) => ImportConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ImportConfig::default(),
    };
    let config = ConfigManager::new(&db_path)?
        .with_base(base)
        .load_import_config()
        .await?;

    let catalog = match &opts.catalog {
        Some(path) => FieldCatalog::from_json_file(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => FieldCatalog::builtin(),
    };

    let store = SqliteRecordStore::new(&db_path)?.with_config(&config);
    Ok(AssetImporterImpl::new(store, config, catalog))
}

fn print_reports(reports: &[ImportReport]) -> anyhow::Result<()> {
    let json = if reports.len() == 1 {
        serde_json::to_string_pretty(&reports[0])?
    } else {
        serde_json::to_string_pretty(reports)?
    };
    println!("{}", json);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    if cli.log_json {
        logging::init_json();
    } else {
        logging::init();
    }
    tracing::debug!(version = asset_import::VERSION, "{}", asset_import::APP_NAME);

    let reports = match cli.command {
        Command::Catalog => {
            println!("{}", FieldCatalog::builtin().to_json()?);
            return Ok(());
        }
        Command::Preview { file, opts } => {
            let importer = build_importer(&opts).await?;
            vec![importer.preview_file(&file, opts.kind).await]
        }
        Command::Execute { files, opts } => {
            let importer = build_importer(&opts).await?;
            let paths: Vec<&Path> = files.iter().map(PathBuf::as_path).collect();
            importer.batch_execute(&paths, opts.kind).await
        }
    };

    print_reports(&reports)?;

    if reports.iter().any(|r| !r.success) {
        std::process::exit(1);
    }
    Ok(())
}
