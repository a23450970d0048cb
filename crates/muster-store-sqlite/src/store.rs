//! [`SqliteStore`], the SQLite implementation of [`PersonnelStore`].

use std::path::Path;

use chrono::NaiveDate;
use muster_core::{
  ImportSummary,
  movement::{Checkup, Movement, NewCheckup, NewMovement},
  person::{NewPerson, Person, PersonChanges},
  store::{PersonnelQuery, PersonnelRecord, PersonnelStore, Stats},
  workbook::Workbook,
};
use uuid::Uuid;

use crate::{Error, Result, records::Records, schema::SCHEMA, sql};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A personnel registry backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` on the database thread.
  pub(crate) async fn with_conn<T, F>(&self, f: F) -> Result<T>
  where
    T: Send + 'static,
    F: FnOnce(&mut rusqlite::Connection) -> Result<T> + Send + 'static,
  {
    self.conn.call(move |conn| Ok(f(conn))).await?
  }
}

// ─── PersonnelStore impl ─────────────────────────────────────────────────────

impl PersonnelStore for SqliteStore {
  type Error = Error;

  // ── Persons ───────────────────────────────────────────────────────────────

  async fn list_personnel(&self, query: &PersonnelQuery) -> Result<Vec<Person>> {
    let query = query.clone();
    self.with_conn(move |conn| sql::list_personnel(conn, &query)).await
  }

  async fn list_units(&self) -> Result<Vec<String>> {
    self.with_conn(|conn| sql::list_units(conn)).await
  }

  async fn get_personnel(&self, id: Uuid) -> Result<Option<PersonnelRecord>> {
    self.with_conn(move |conn| sql::personnel_record(conn, id)).await
  }

  async fn create_personnel(&self, person: NewPerson) -> Result<Person> {
    let created = self.with_conn(move |conn| sql::insert_person(conn, person)).await?;
    tracing::info!(id = %created.id, "person created");
    Ok(created)
  }

  async fn update_personnel(&self, id: Uuid, changes: PersonChanges) -> Result<Option<Person>> {
    self
      .with_conn(move |conn| {
        if sql::update_person(conn, id, &changes)? {
          sql::get_person(conn, id)
        } else {
          Ok(None)
        }
      })
      .await
  }

  // ── Timeline ──────────────────────────────────────────────────────────────

  async fn add_movement(&self, movement: NewMovement) -> Result<Option<Movement>> {
    self.with_conn(move |conn| sql::add_movement(conn, movement)).await
  }

  async fn add_checkup(&self, checkup: NewCheckup) -> Result<Option<Checkup>> {
    self.with_conn(move |conn| sql::add_checkup(conn, checkup)).await
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn stats(&self) -> Result<Stats> { self.with_conn(|conn| sql::stats(conn)).await }

  // ── Bulk import ───────────────────────────────────────────────────────────

  async fn import_workbook(&self, workbook: Workbook, today: NaiveDate) -> Result<ImportSummary> {
    self
      .with_conn(move |conn| {
        let tx = conn.transaction()?;
        let summary = muster_core::import_workbook(&mut Records::new(&tx), &workbook, today)?;
        tx.commit()?;
        Ok(summary)
      })
      .await
  }

  fn is_conflict(err: &Error) -> bool { matches!(err, Error::DuplicatePersonalNumber(_)) }
}
