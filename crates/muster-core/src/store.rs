//! Storage abstractions.
//!
//! Two traits live here:
//!
//! - [`RecordStore`]: the synchronous, row-at-a-time interface the import
//!   engine drives. One value represents one open transaction.
//! - [`PersonnelStore`]: the async, request-scoped interface used by the
//!   HTTP layer for queries, explicit edits, statistics and whole-workbook
//!   imports.
//!
//! Both are implemented by storage backends (e.g. `muster-store-sqlite`).

use std::future::Future;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  import::ImportSummary,
  movement::{Checkup, Movement, MovementKind, NewCheckup, NewMovement},
  person::{NewPerson, Person, PersonChanges, Status},
  workbook::Workbook,
};

// ─── Import-side store ───────────────────────────────────────────────────────

/// Row-level storage operations used while reconciling a workbook.
///
/// Implementations are expected to run inside a single transaction that the
/// caller commits once the whole import succeeds.
pub trait RecordStore {
  type Error: std::error::Error + Send + Sync + 'static;

  fn find_person_by_personal_number(
    &mut self,
    number: &str,
  ) -> Result<Option<Person>, Self::Error>;

  /// Fallback identity for rows without a personal number: every person
  /// with exactly this full name, oldest first.
  fn find_persons_by_full_name(&mut self, full_name: &str) -> Result<Vec<Person>, Self::Error>;

  fn insert_person(&mut self, person: NewPerson) -> Result<Uuid, Self::Error>;

  fn update_person(&mut self, id: Uuid, changes: &PersonChanges) -> Result<(), Self::Error>;

  fn append_movement(&mut self, movement: NewMovement) -> Result<(), Self::Error>;

  /// Whether the person has a movement of `kind` with no end date.
  fn find_open_movement(&mut self, person_id: Uuid, kind: MovementKind)
  -> Result<bool, Self::Error>;

  /// Whether the person has a movement of `kind` starting on `date`.
  fn has_movement_on(
    &mut self,
    person_id: Uuid,
    kind: MovementKind,
    date: NaiveDate,
  ) -> Result<bool, Self::Error>;

  fn append_checkup(&mut self, checkup: NewCheckup) -> Result<(), Self::Error>;

  /// Open a nested scope for one row's writes.
  fn begin_row(&mut self) -> Result<(), Self::Error> { Ok(()) }

  /// Close the scope opened by [`RecordStore::begin_row`], keeping its
  /// writes when `keep` is true and discarding them otherwise.
  fn finish_row(&mut self, _keep: bool) -> Result<(), Self::Error> { Ok(()) }

  /// Whether `err` means the store itself is unusable (connection lost, disk
  /// full, corruption) rather than that one row's data was rejected.
  /// Infrastructure errors abort the import; all others fail only the row.
  fn is_infrastructure(_err: &Self::Error) -> bool { false }
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// Parameters for [`PersonnelStore::list_personnel`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonnelQuery {
  /// Case-insensitive substring over full name and personal number.
  pub search: Option<String>,
  /// Exact unit match.
  pub unit:   Option<String>,
  pub status: Option<Status>,
}

/// A person together with their timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonnelRecord {
  pub person:    Person,
  /// Newest first.
  pub movements: Vec<Movement>,
  /// Newest first.
  pub checkups:  Vec<Checkup>,
}

/// Headcount by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
  pub total:        u64,
  pub active:       u64,
  pub pvd:          u64,
  pub hospitalized: u64,
  pub leave:        u64,
  pub discharged:   u64,
}

// ─── Request-side store ──────────────────────────────────────────────────────

/// Abstraction over a personnel registry backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait PersonnelStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Persons ───────────────────────────────────────────────────────────

  /// Persons matching `query`, most recently created first.
  fn list_personnel<'a>(
    &'a self,
    query: &'a PersonnelQuery,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// Distinct non-empty units, sorted.
  fn list_units(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// A person and their movements and checkups. `None` if not found.
  fn get_personnel(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<PersonnelRecord>, Self::Error>> + Send + '_;

  /// Create a person. Fails if the personal number is already taken.
  fn create_personnel(
    &self,
    person: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Apply `changes` and return the updated person. `None` if not found.
  fn update_personnel(
    &self,
    id: Uuid,
    changes: PersonChanges,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  // ── Timeline ──────────────────────────────────────────────────────────

  /// Append a movement. Leave, hospitalization and discharge movements also
  /// set the person's current status. `None` if the person does not exist.
  fn add_movement(
    &self,
    movement: NewMovement,
  ) -> impl Future<Output = Result<Option<Movement>, Self::Error>> + Send + '_;

  /// Append a checkup. A checkup with a fitness category also updates the
  /// person's category and category date. `None` if the person does not
  /// exist.
  fn add_checkup(
    &self,
    checkup: NewCheckup,
  ) -> impl Future<Output = Result<Option<Checkup>, Self::Error>> + Send + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  fn stats(&self) -> impl Future<Output = Result<Stats, Self::Error>> + Send + '_;

  // ── Bulk import ───────────────────────────────────────────────────────

  /// Reconcile every sheet of `workbook` in one transaction. `today` dates
  /// derived movements and checkups.
  fn import_workbook(
    &self,
    workbook: Workbook,
    today: NaiveDate,
  ) -> impl Future<Output = Result<ImportSummary, Self::Error>> + Send + '_;

  /// Whether `err` reports a uniqueness conflict, such as a personal number
  /// that is already taken.
  fn is_conflict(_err: &Self::Error) -> bool { false }
}
