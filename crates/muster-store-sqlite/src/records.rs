//! [`RecordStore`] over an open import transaction.

use chrono::NaiveDate;
use muster_core::{
  movement::{MovementKind, NewCheckup, NewMovement},
  person::{NewPerson, Person, PersonChanges},
  store::RecordStore,
};
use rusqlite::Connection;
use uuid::Uuid;

use crate::{Error, Result, sql};

/// Row-level writes against a connection that already has a transaction
/// open. Each row is wrapped in its own savepoint.
pub struct Records<'c> {
  conn: &'c Connection,
}

impl<'c> Records<'c> {
  pub fn new(conn: &'c Connection) -> Self { Self { conn } }
}

impl RecordStore for Records<'_> {
  type Error = Error;

  fn find_person_by_personal_number(&mut self, number: &str) -> Result<Option<Person>> {
    sql::find_person_by_number(self.conn, number)
  }

  fn find_persons_by_full_name(&mut self, full_name: &str) -> Result<Vec<Person>> {
    sql::find_persons_by_name(self.conn, full_name)
  }

  fn insert_person(&mut self, person: NewPerson) -> Result<Uuid> {
    Ok(sql::insert_person(self.conn, person)?.id)
  }

  fn update_person(&mut self, id: Uuid, changes: &PersonChanges) -> Result<()> {
    if sql::update_person(self.conn, id, changes)? {
      Ok(())
    } else {
      Err(Error::PersonNotFound(id))
    }
  }

  fn append_movement(&mut self, movement: NewMovement) -> Result<()> {
    sql::insert_movement(self.conn, movement)?;
    Ok(())
  }

  fn find_open_movement(&mut self, person_id: Uuid, kind: MovementKind) -> Result<bool> {
    sql::has_open_movement(self.conn, person_id, kind)
  }

  fn has_movement_on(&mut self, person_id: Uuid, kind: MovementKind, date: NaiveDate) -> Result<bool> {
    sql::has_movement_on(self.conn, person_id, kind, date)
  }

  fn append_checkup(&mut self, checkup: NewCheckup) -> Result<()> {
    sql::insert_checkup(self.conn, checkup)?;
    Ok(())
  }

  fn begin_row(&mut self) -> Result<()> {
    self.conn.execute_batch("SAVEPOINT import_row")?;
    Ok(())
  }

  fn finish_row(&mut self, keep: bool) -> Result<()> {
    if keep {
      self.conn.execute_batch("RELEASE import_row")?;
    } else {
      self.conn.execute_batch("ROLLBACK TO import_row; RELEASE import_row")?;
    }
    Ok(())
  }

  fn is_infrastructure(err: &Error) -> bool { err.is_infrastructure() }
}
