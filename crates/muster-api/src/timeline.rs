//! Handlers for timeline writes: `POST /movements` and `POST /medical-visits`.
//!
//! Both return 201 with the stored record, or 404 when `person_id` does not
//! name a known person.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use muster_core::{
  movement::{NewCheckup, NewMovement},
  store::PersonnelStore,
};

use crate::error::ApiError;

/// `POST /movements`, body: a [`NewMovement`]
pub async fn create_movement<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewMovement>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonnelStore,
{
  if body.end_date.is_some_and(|end| end < body.start_date) {
    return Err(ApiError::BadRequest("end_date precedes start_date".into()));
  }

  let person_id = body.person_id;
  let movement = store
    .add_movement(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("person {person_id} not found")))?;
  Ok((StatusCode::CREATED, Json(movement)))
}

/// `POST /medical-visits`, body: a [`NewCheckup`]
pub async fn create_visit<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewCheckup>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonnelStore,
{
  if body.diagnosis.trim().is_empty() {
    return Err(ApiError::BadRequest("diagnosis must not be empty".into()));
  }

  let person_id = body.person_id;
  let checkup = store
    .add_checkup(body)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("person {person_id} not found")))?;
  Ok((StatusCode::CREATED, Json(checkup)))
}
