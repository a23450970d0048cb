//! Handler for `GET /stats`.

use std::sync::Arc;

use axum::{Json, extract::State};
use muster_core::store::{PersonnelStore, Stats};

use crate::error::ApiError;

/// `GET /stats`: headcount by status.
pub async fn handler<S>(State(store): State<Arc<S>>) -> Result<Json<Stats>, ApiError>
where
  S: PersonnelStore,
{
  let stats = store.stats().await.map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(stats))
}
