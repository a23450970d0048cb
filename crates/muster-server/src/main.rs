//! Muster server binary.
//!
//! Reads `config.toml` (or the path given with `--config`), layers `MUSTER_*`
//! environment variables over it and opens the SQLite store.
//!
//! ```text
//! muster serve                 # run the HTTP API
//! muster import roster.xlsx    # import one workbook and print the summary
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use muster_core::{import, store::PersonnelStore};
use muster_server::ServerConfig;
use muster_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Muster personnel registry")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the JSON API (the default).
  Serve,
  /// Import a spreadsheet into the store and print the summary as JSON.
  Import {
    /// Path to an .xlsx/.xls/.ods workbook.
    file: PathBuf,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("MUSTER"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  // Expand `~` in store path.
  let store_path = expand_tilde(&server_cfg.store_path);

  // Open SQLite store.
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, &server_cfg).await,
    Command::Import { file } => import_file(&store, &file).await,
  }
}

async fn serve(store: SqliteStore, cfg: &ServerConfig) -> anyhow::Result<()> {
  let app = muster_server::app(Arc::new(store));
  let address = format!("{}:{}", cfg.host, cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

async fn import_file(store: &SqliteStore, file: &Path) -> anyhow::Result<()> {
  let bytes = tokio::fs::read(file)
    .await
    .with_context(|| format!("failed to read {file:?}"))?;
  let workbook =
    muster_xlsx::read(&bytes).with_context(|| format!("failed to parse {file:?}"))?;
  import::validate(&workbook).with_context(|| format!("{file:?} has nothing to import"))?;

  let today = chrono::Local::now().date_naive();
  let summary = store
    .import_workbook(workbook, today)
    .await
    .context("import failed")?;

  for error in &summary.errors {
    tracing::warn!("{error}");
  }
  println!("{}", serde_json::to_string_pretty(&summary)?);

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
