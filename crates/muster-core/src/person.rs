//! Person: the long-lived, mutable record at the centre of the registry.
//!
//! A person is identified by an optional external `personal_number` and
//! otherwise by `full_name`. Persons are created and updated, never deleted.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, movement::MovementKind};

// ─── Rank ────────────────────────────────────────────────────────────────────

/// Military rank, from lowest to highest.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Rank {
  Private,
  Corporal,
  JuniorSergeant,
  Sergeant,
  SeniorSergeant,
  Foreman,
  WarrantOfficer,
  SeniorWarrantOfficer,
  JuniorLieutenant,
  Lieutenant,
  SeniorLieutenant,
  Captain,
  Major,
  LieutenantColonel,
  Colonel,
}

impl Rank {
  pub const ALL: [Rank; 15] = [
    Rank::Private,
    Rank::Corporal,
    Rank::JuniorSergeant,
    Rank::Sergeant,
    Rank::SeniorSergeant,
    Rank::Foreman,
    Rank::WarrantOfficer,
    Rank::SeniorWarrantOfficer,
    Rank::JuniorLieutenant,
    Rank::Lieutenant,
    Rank::SeniorLieutenant,
    Rank::Captain,
    Rank::Major,
    Rank::LieutenantColonel,
    Rank::Colonel,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Rank::Private => "private",
      Rank::Corporal => "corporal",
      Rank::JuniorSergeant => "junior_sergeant",
      Rank::Sergeant => "sergeant",
      Rank::SeniorSergeant => "senior_sergeant",
      Rank::Foreman => "foreman",
      Rank::WarrantOfficer => "warrant_officer",
      Rank::SeniorWarrantOfficer => "senior_warrant_officer",
      Rank::JuniorLieutenant => "junior_lieutenant",
      Rank::Lieutenant => "lieutenant",
      Rank::SeniorLieutenant => "senior_lieutenant",
      Rank::Captain => "captain",
      Rank::Major => "major",
      Rank::LieutenantColonel => "lieutenant_colonel",
      Rank::Colonel => "colonel",
    }
  }
}

impl FromStr for Rank {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Rank::ALL
      .into_iter()
      .find(|r| r.as_str() == s)
      .ok_or_else(|| Error::UnknownRank(s.to_owned()))
  }
}

impl fmt::Display for Rank {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// A person's current duty status.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Status {
  /// In formation; the default.
  #[default]
  Active,
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

impl Status {
  pub const ALL: [Status; 11] = [
    Status::Active,
    Status::Leave,
    Status::BusinessTrip,
    Status::Hospitalized,
    Status::Vkk,
    Status::Vvk,
    Status::Cvvk,
    Status::VvkCategoryChange,
    Status::Pvd,
    Status::AmbulatoryTreatment,
    Status::Discharge,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Status::Active => "active",
      Status::Leave => "leave",
      Status::BusinessTrip => "business_trip",
      Status::Hospitalized => "hospitalized",
      Status::Vkk => "vkk",
      Status::Vvk => "vvk",
      Status::Cvvk => "cvvk",
      Status::VvkCategoryChange => "vvk_category_change",
      Status::Pvd => "pvd",
      Status::AmbulatoryTreatment => "ambulatory_treatment",
      Status::Discharge => "discharge",
    }
  }

  /// The movement a person in this status is undergoing; `None` for active.
  pub fn movement_kind(self) -> Option<MovementKind> {
    match self {
      Status::Active => None,
      Status::Leave => Some(MovementKind::Leave),
      Status::BusinessTrip => Some(MovementKind::BusinessTrip),
      Status::Hospitalized => Some(MovementKind::Hospitalized),
      Status::Vkk => Some(MovementKind::Vkk),
      Status::Vvk => Some(MovementKind::Vvk),
      Status::Cvvk => Some(MovementKind::Cvvk),
      Status::VvkCategoryChange => Some(MovementKind::VvkCategoryChange),
      Status::Pvd => Some(MovementKind::Pvd),
      Status::AmbulatoryTreatment => Some(MovementKind::AmbulatoryTreatment),
      Status::Discharge => Some(MovementKind::Discharge),
    }
  }
}

impl FromStr for Status {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Status::ALL
      .into_iter()
      .find(|st| st.as_str() == s)
      .ok_or_else(|| Error::UnknownStatus(s.to_owned()))
  }
}

impl fmt::Display for Status {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── Fitness category ────────────────────────────────────────────────────────

/// Medical fitness-for-duty category; `A` is best, `D` is worst.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum FitnessCategory {
  A,
  B,
  V,
  G,
  D,
}

impl FitnessCategory {
  pub const ALL: [FitnessCategory; 5] = [
    FitnessCategory::A,
    FitnessCategory::B,
    FitnessCategory::V,
    FitnessCategory::G,
    FitnessCategory::D,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      FitnessCategory::A => "A",
      FitnessCategory::B => "B",
      FitnessCategory::V => "V",
      FitnessCategory::G => "G",
      FitnessCategory::D => "D",
    }
  }
}

impl FromStr for FitnessCategory {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    FitnessCategory::ALL
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| Error::UnknownFitnessCategory(s.to_owned()))
  }
}

impl fmt::Display for FitnessCategory {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

// ─── Person ──────────────────────────────────────────────────────────────────

/// A stored person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
  pub id:                    Uuid,
  /// External identifier; unique when present.
  pub personal_number:       Option<String>,
  pub full_name:             String,
  pub rank:                  Option<Rank>,
  pub birth_date:            Option<NaiveDate>,
  pub military_id:           Option<String>,
  pub unit:                  Option<String>,
  pub phone:                 Option<String>,
  pub current_status:        Status,
  pub fitness_category:      Option<FitnessCategory>,
  pub fitness_category_date: Option<NaiveDate>,
  pub notes:                 Option<String>,
  pub created_at:            DateTime<Utc>,
  pub updated_at:            DateTime<Utc>,
}

/// Input for creating a [`Person`]. The store assigns `id` and timestamps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPerson {
  pub personal_number:       Option<String>,
  pub full_name:             String,
  pub rank:                  Option<Rank>,
  pub birth_date:            Option<NaiveDate>,
  pub military_id:           Option<String>,
  pub unit:                  Option<String>,
  pub phone:                 Option<String>,
  #[serde(default)]
  pub current_status:        Status,
  pub fitness_category:      Option<FitnessCategory>,
  pub fitness_category_date: Option<NaiveDate>,
  pub notes:                 Option<String>,
}

impl NewPerson {
  pub fn new(full_name: impl Into<String>) -> Self {
    Self { full_name: full_name.into(), ..Default::default() }
  }
}

/// A partial update to a [`Person`].
///
/// For every optional attribute the outer `Option` says whether the field is
/// written at all: `None` keeps the stored value, `Some(None)` clears it and
/// `Some(Some(v))` overwrites it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonChanges {
  pub full_name:             Option<String>,
  pub rank:                  Option<Option<Rank>>,
  pub birth_date:            Option<Option<NaiveDate>>,
  pub military_id:           Option<Option<String>>,
  pub unit:                  Option<Option<String>>,
  pub phone:                 Option<Option<String>>,
  pub current_status:        Option<Status>,
  pub fitness_category:      Option<Option<FitnessCategory>>,
  pub fitness_category_date: Option<Option<NaiveDate>>,
  pub notes:                 Option<Option<String>>,
}

impl PersonChanges {
  /// True when applying these changes would write nothing.
  pub fn is_empty(&self) -> bool { *self == Self::default() }

  /// Apply the changes to an in-memory person.
  pub fn apply_to(&self, person: &mut Person) {
    if let Some(v) = &self.full_name {
      person.full_name = v.clone();
    }
    if let Some(v) = self.rank {
      person.rank = v;
    }
    if let Some(v) = self.birth_date {
      person.birth_date = v;
    }
    if let Some(v) = &self.military_id {
      person.military_id = v.clone();
    }
    if let Some(v) = &self.unit {
      person.unit = v.clone();
    }
    if let Some(v) = &self.phone {
      person.phone = v.clone();
    }
    if let Some(v) = self.current_status {
      person.current_status = v;
    }
    if let Some(v) = self.fitness_category {
      person.fitness_category = v;
    }
    if let Some(v) = self.fitness_category_date {
      person.fitness_category_date = v;
    }
    if let Some(v) = &self.notes {
      person.notes = v.clone();
    }
  }
}
