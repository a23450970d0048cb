//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, calendar dates are `YYYY-MM-DD`, enums
//! are their slugs and UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use muster_core::{
  movement::{Checkup, Movement, MovementKind},
  person::{FitnessCategory, Person, Rank, Status},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const PERSON_COLUMNS: &str = "id, personal_number, full_name, rank, birth_date, military_id, \
                                  unit, phone, current_status, fitness_category, \
                                  fitness_category_date, notes, created_at, updated_at";

/// Raw strings read directly from a `personnel` row.
pub struct RawPerson {
  pub id:                    String,
  pub personal_number:       Option<String>,
  pub full_name:             String,
  pub rank:                  Option<String>,
  pub birth_date:            Option<String>,
  pub military_id:           Option<String>,
  pub unit:                  Option<String>,
  pub phone:                 Option<String>,
  pub current_status:        String,
  pub fitness_category:      Option<String>,
  pub fitness_category_date: Option<String>,
  pub notes:                 Option<String>,
  pub created_at:            String,
  pub updated_at:            String,
}

impl RawPerson {
  /// Read a row selected with [`PERSON_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                    row.get(0)?,
      personal_number:       row.get(1)?,
      full_name:             row.get(2)?,
      rank:                  row.get(3)?,
      birth_date:            row.get(4)?,
      military_id:           row.get(5)?,
      unit:                  row.get(6)?,
      phone:                 row.get(7)?,
      current_status:        row.get(8)?,
      fitness_category:      row.get(9)?,
      fitness_category_date: row.get(10)?,
      notes:                 row.get(11)?,
      created_at:            row.get(12)?,
      updated_at:            row.get(13)?,
    })
  }

  pub fn into_person(self) -> Result<Person> {
    Ok(Person {
      id:                    decode_uuid(&self.id)?,
      personal_number:       self.personal_number,
      full_name:             self.full_name,
      rank:                  self.rank.as_deref().map(str::parse::<Rank>).transpose()?,
      birth_date:            decode_opt_date(self.birth_date)?,
      military_id:           self.military_id,
      unit:                  self.unit,
      phone:                 self.phone,
      current_status:        self.current_status.parse::<Status>()?,
      fitness_category:      self.fitness_category.as_deref().map(str::parse::<FitnessCategory>).transpose()?,
      fitness_category_date: decode_opt_date(self.fitness_category_date)?,
      notes:                 self.notes,
      created_at:            decode_dt(&self.created_at)?,
      updated_at:            decode_dt(&self.updated_at)?,
    })
  }
}

pub const MOVEMENT_COLUMNS: &str = "id, person_id, kind, start_date, end_date, destination, vmo, \
                                    expected_return_date, notes, created_at";

/// Raw strings read directly from a `movements` row.
pub struct RawMovement {
  pub id:                   String,
  pub person_id:            String,
  pub kind:                 String,
  pub start_date:           String,
  pub end_date:             Option<String>,
  pub destination:          Option<String>,
  pub vmo:                  Option<String>,
  pub expected_return_date: Option<String>,
  pub notes:                Option<String>,
  pub created_at:           String,
}

impl RawMovement {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:                   row.get(0)?,
      person_id:            row.get(1)?,
      kind:                 row.get(2)?,
      start_date:           row.get(3)?,
      end_date:             row.get(4)?,
      destination:          row.get(5)?,
      vmo:                  row.get(6)?,
      expected_return_date: row.get(7)?,
      notes:                row.get(8)?,
      created_at:           row.get(9)?,
    })
  }

  pub fn into_movement(self) -> Result<Movement> {
    Ok(Movement {
      id:                   decode_uuid(&self.id)?,
      person_id:            decode_uuid(&self.person_id)?,
      kind:                 self.kind.parse::<MovementKind>()?,
      start_date:           decode_date(&self.start_date)?,
      end_date:             decode_opt_date(self.end_date)?,
      destination:          self.destination,
      vmo:                  self.vmo,
      expected_return_date: decode_opt_date(self.expected_return_date)?,
      notes:                self.notes,
      created_at:           decode_dt(&self.created_at)?,
    })
  }
}

pub const CHECKUP_COLUMNS: &str = "id, person_id, checkup_date, diagnosis, fitness_category, \
                                   doctor_specialty, recommendations, notes, created_at";

/// Raw strings read directly from a `checkups` row.
pub struct RawCheckup {
  pub id:               String,
  pub person_id:        String,
  pub checkup_date:     String,
  pub diagnosis:        String,
  pub fitness_category: Option<String>,
  pub doctor_specialty: Option<String>,
  pub recommendations:  Option<String>,
  pub notes:            Option<String>,
  pub created_at:       String,
}

impl RawCheckup {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      person_id:        row.get(1)?,
      checkup_date:     row.get(2)?,
      diagnosis:        row.get(3)?,
      fitness_category: row.get(4)?,
      doctor_specialty: row.get(5)?,
      recommendations:  row.get(6)?,
      notes:            row.get(7)?,
      created_at:       row.get(8)?,
    })
  }

  pub fn into_checkup(self) -> Result<Checkup> {
    Ok(Checkup {
      id:               decode_uuid(&self.id)?,
      person_id:        decode_uuid(&self.person_id)?,
      checkup_date:     decode_date(&self.checkup_date)?,
      diagnosis:        self.diagnosis,
      fitness_category: self.fitness_category.as_deref().map(str::parse::<FitnessCategory>).transpose()?,
      doctor_specialty: self.doctor_specialty,
      recommendations:  self.recommendations,
      notes:            self.notes,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}
