//! JSON REST API for Muster.
//!
//! Exposes an axum [`Router`] backed by any
//! [`muster_core::store::PersonnelStore`]. TLS and transport concerns are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", muster_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod import;
pub mod personnel;
pub mod stats;
pub mod timeline;

use std::sync::Arc;

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use muster_core::store::PersonnelStore;

pub use error::ApiError;

/// Largest accepted `/import` body. Base64 inflates a workbook by a third.
pub const IMPORT_BODY_LIMIT: usize = 64 * 1024 * 1024;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PersonnelStore + 'static,
{
  Router::new()
    // Personnel
    .route("/personnel", get(personnel::list::<S>).post(personnel::create::<S>))
    .route("/personnel/{id}", get(personnel::get_one::<S>).put(personnel::update::<S>))
    // Timeline
    .route("/movements", post(timeline::create_movement::<S>))
    .route("/medical-visits", post(timeline::create_visit::<S>))
    // Aggregates
    .route("/stats", get(stats::handler::<S>))
    // Bulk import
    .route(
      "/import",
      post(import::handler::<S>).layer(DefaultBodyLimit::max(IMPORT_BODY_LIMIT)),
    )
    .with_state(store)
}

#[cfg(test)]
mod tests;
