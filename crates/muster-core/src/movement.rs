//! Timeline records anchored to a person: movements and medical checkups.
//!
//! Both are append-only. Import never edits them; only the explicit API
//! endpoints create them outside of an import.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error,
  person::{FitnessCategory, Status},
};

// ─── Movement kind ───────────────────────────────────────────────────────────

/// What a movement records: an arrival, or the start of a non-active status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
  Arrival,
  Leave,
  BusinessTrip,
  Hospitalized,
  Vkk,
  Vvk,
  Cvvk,
  VvkCategoryChange,
  Pvd,
  AmbulatoryTreatment,
  Discharge,
}

impl MovementKind {
  pub const ALL: [MovementKind; 11] = [
    MovementKind::Arrival,
    MovementKind::Leave,
    MovementKind::BusinessTrip,
    MovementKind::Hospitalized,
    MovementKind::Vkk,
    MovementKind::Vvk,
    MovementKind::Cvvk,
    MovementKind::VvkCategoryChange,
    MovementKind::Pvd,
    MovementKind::AmbulatoryTreatment,
    MovementKind::Discharge,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      MovementKind::Arrival => "arrival",
      MovementKind::Leave => "leave",
      MovementKind::BusinessTrip => "business_trip",
      MovementKind::Hospitalized => "hospitalized",
      MovementKind::Vkk => "vkk",
      MovementKind::Vvk => "vvk",
      MovementKind::Cvvk => "cvvk",
      MovementKind::VvkCategoryChange => "vvk_category_change",
      MovementKind::Pvd => "pvd",
      MovementKind::AmbulatoryTreatment => "ambulatory_treatment",
      MovementKind::Discharge => "discharge",
    }
  }

  /// The status a person takes on when a movement of this kind is recorded
  /// through the API. Only leave, hospitalization and discharge move the
  /// current status.
  pub fn resulting_status(self) -> Option<Status> {
    match self {
      MovementKind::Leave => Some(Status::Leave),
      MovementKind::Hospitalized => Some(Status::Hospitalized),
      MovementKind::Discharge => Some(Status::Discharge),
      _ => None,
    }
  }
}

impl FromStr for MovementKind {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    MovementKind::ALL
      .into_iter()
      .find(|k| k.as_str() == s)
      .ok_or_else(|| Error::UnknownMovementKind(s.to_owned()))
  }
}

impl fmt::Display for MovementKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── Movement ────────────────────────────────────────────────────────────────

/// A dated event changing a person's location or status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
  pub id:                   Uuid,
  pub person_id:            Uuid,
  pub kind:                 MovementKind,
  pub start_date:           NaiveDate,
  pub end_date:             Option<NaiveDate>,
  pub destination:          Option<String>,
  /// Medical-board office associated with the status change.
  pub vmo:                  Option<String>,
  pub expected_return_date: Option<NaiveDate>,
  pub notes:                Option<String>,
  pub created_at:           DateTime<Utc>,
}

impl Movement {
  /// A movement without an end date is still ongoing.
  pub fn is_open(&self) -> bool { self.end_date.is_none() }
}

/// Input for appending a [`Movement`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMovement {
  pub person_id:            Uuid,
  pub kind:                 MovementKind,
  pub start_date:           NaiveDate,
  #[serde(default)]
  pub end_date:             Option<NaiveDate>,
  #[serde(default)]
  pub destination:          Option<String>,
  #[serde(default)]
  pub vmo:                  Option<String>,
  #[serde(default)]
  pub expected_return_date: Option<NaiveDate>,
  #[serde(default)]
  pub notes:                Option<String>,
}

impl NewMovement {
  pub fn new(person_id: Uuid, kind: MovementKind, start_date: NaiveDate) -> Self {
    Self {
      person_id,
      kind,
      start_date,
      end_date: None,
      destination: None,
      vmo: None,
      expected_return_date: None,
      notes: None,
    }
  }
}

// ─── Checkup ─────────────────────────────────────────────────────────────────

/// One medical fitness assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkup {
  pub id:               Uuid,
  pub person_id:        Uuid,
  pub checkup_date:     NaiveDate,
  pub diagnosis:        String,
  pub fitness_category: Option<FitnessCategory>,
  pub doctor_specialty: Option<String>,
  pub recommendations:  Option<String>,
  pub notes:            Option<String>,
  pub created_at:       DateTime<Utc>,
}

/// Input for appending a [`Checkup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCheckup {
  pub person_id:        Uuid,
  pub checkup_date:     NaiveDate,
  pub diagnosis:        String,
  #[serde(default)]
  pub fitness_category: Option<FitnessCategory>,
  #[serde(default)]
  pub doctor_specialty: Option<String>,
  #[serde(default)]
  pub recommendations:  Option<String>,
  #[serde(default)]
  pub notes:            Option<String>,
}
