//! Handlers for `/personnel` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/personnel` | Optional `?search=&unit=&status=` |
//! | `POST` | `/personnel` | 409 if the personal number is taken |
//! | `GET`  | `/personnel/:id` | Person with movements and medical visits; 404 if not found |
//! | `PUT`  | `/personnel/:id` | Partial update; `null` clears a field; 404 if not found |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use muster_core::{
  movement::{Checkup, Movement},
  person::{FitnessCategory, NewPerson, Person, PersonChanges, Rank, Status},
  store::{PersonnelQuery, PersonnelStore},
};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub personnel: Vec<Person>,
  /// Every known unit, for filter pickers.
  pub units:     Vec<String>,
}

/// `GET /personnel[?search=<text>&unit=<unit>&status=<status>]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(mut query): Query<PersonnelQuery>,
) -> Result<Json<ListResponse>, ApiError>
where
  S: PersonnelStore,
{
  query.search = query.search.filter(|s| !s.trim().is_empty());
  query.unit = query.unit.filter(|u| !u.trim().is_empty());

  let personnel = store
    .list_personnel(&query)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  let units = store
    .list_units()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;
  Ok(Json(ListResponse { personnel, units }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /personnel`, body: a [`NewPerson`]
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(mut body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonnelStore,
{
  body.full_name = body.full_name.trim().to_owned();
  if body.full_name.is_empty() {
    return Err(ApiError::BadRequest("full_name must not be empty".into()));
  }

  let person = store
    .create_personnel(body)
    .await
    .map_err(ApiError::from_store::<S>)?;
  Ok((StatusCode::CREATED, Json(person)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct DetailResponse {
  pub personnel:      Person,
  pub movements:      Vec<Movement>,
  pub medical_visits: Vec<Checkup>,
}

/// `GET /personnel/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<DetailResponse>, ApiError>
where
  S: PersonnelStore,
{
  let record = store
    .get_personnel(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(DetailResponse {
    personnel:      record.person,
    movements:      record.movements,
    medical_visits: record.checkups,
  }))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Body of `PUT /personnel/:id`. An absent field is left alone; an explicit
/// `null` clears it.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub full_name:             Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub rank:                  Option<Option<Rank>>,
  #[serde(default, deserialize_with = "present")]
  pub birth_date:            Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "present")]
  pub military_id:           Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub unit:                  Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub phone:                 Option<Option<String>>,
  pub current_status:        Option<Status>,
  #[serde(default, deserialize_with = "present")]
  pub fitness_category:      Option<Option<FitnessCategory>>,
  #[serde(default, deserialize_with = "present")]
  pub fitness_category_date: Option<Option<NaiveDate>>,
  #[serde(default, deserialize_with = "present")]
  pub notes:                 Option<Option<String>>,
}

/// Marks a field that appeared in the body, even as `null`.
fn present<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  T: Deserialize<'de>,
  D: Deserializer<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

impl From<UpdateBody> for PersonChanges {
  fn from(body: UpdateBody) -> Self {
    PersonChanges {
      full_name:             body.full_name,
      rank:                  body.rank,
      birth_date:            body.birth_date,
      military_id:           body.military_id,
      unit:                  body.unit,
      phone:                 body.phone,
      current_status:        body.current_status,
      fitness_category:      body.fitness_category,
      fitness_category_date: body.fitness_category_date,
      notes:                 body.notes,
    }
  }
}

/// `PUT /personnel/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Person>, ApiError>
where
  S: PersonnelStore,
{
  if body.full_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
    return Err(ApiError::BadRequest("full_name must not be empty".into()));
  }

  let person = store
    .update_personnel(id, body.into())
    .await
    .map_err(ApiError::from_store::<S>)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;
  Ok(Json(person))
}
