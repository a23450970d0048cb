//! Muster server: configuration and the top-level HTTP application.

use std::{path::PathBuf, sync::Arc};

use axum::Router;
use muster_core::store::PersonnelStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Config ───────────────────────────────────────────────────────────────────

/// Settings read from the config file and `MUSTER_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  /// SQLite database file; a leading `~` is expanded.
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("muster.db") }

impl Default for ServerConfig {
  fn default() -> Self {
    Self { host: default_host(), port: default_port(), store_path: default_store_path() }
  }
}

// ─── App ──────────────────────────────────────────────────────────────────────

/// The API mounted under `/api`, with request tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: PersonnelStore + 'static,
{
  Router::new()
    .nest("/api", muster_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}
