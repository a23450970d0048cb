//! In-memory [`RecordStore`] for unit tests, with failure injection.

use chrono::{NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
  movement::{Checkup, Movement, MovementKind, NewCheckup, NewMovement},
  person::{NewPerson, Person, PersonChanges},
  store::RecordStore,
};

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("personal number {0} already exists")]
  Duplicate(String),
  #[error("personal number {0} rejected")]
  Rejected(String),
  #[error("movement rejected")]
  MovementRejected,
  #[error("no person {0}")]
  Missing(Uuid),
  #[error("store offline")]
  Offline,
}

type Snapshot = (Vec<Person>, Vec<Movement>, Vec<Checkup>);

#[derive(Debug, Default)]
pub struct MemoryStore {
  pub persons:          Vec<Person>,
  pub movements:        Vec<Movement>,
  pub checkups:         Vec<Checkup>,
  /// Inserting a person with this personal number fails.
  pub reject_number:    Option<String>,
  /// Every movement append fails.
  pub reject_movements: bool,
  /// Every call fails with an infrastructure error.
  pub offline:          bool,
  pub(crate) savepoints: Vec<Snapshot>,
}

impl MemoryStore {
  fn online(&self) -> Result<(), MemoryError> {
    if self.offline { Err(MemoryError::Offline) } else { Ok(()) }
  }
}

impl RecordStore for MemoryStore {
  type Error = MemoryError;

  fn find_person_by_personal_number(&mut self, number: &str) -> Result<Option<Person>, MemoryError> {
    self.online()?;
    Ok(self.persons.iter().find(|p| p.personal_number.as_deref() == Some(number)).cloned())
  }

  fn find_persons_by_full_name(&mut self, full_name: &str) -> Result<Vec<Person>, MemoryError> {
    self.online()?;
    Ok(self.persons.iter().filter(|p| p.full_name == full_name).cloned().collect())
  }

  fn insert_person(&mut self, person: NewPerson) -> Result<Uuid, MemoryError> {
    self.online()?;
    if let Some(number) = &person.personal_number {
      if self.reject_number.as_ref() == Some(number) {
        return Err(MemoryError::Rejected(number.clone()));
      }
      if self.persons.iter().any(|p| p.personal_number.as_ref() == Some(number)) {
        return Err(MemoryError::Duplicate(number.clone()));
      }
    }
    let now = Utc::now();
    let id = Uuid::new_v4();
    self.persons.push(Person {
      id,
      personal_number: person.personal_number,
      full_name: person.full_name,
      rank: person.rank,
      birth_date: person.birth_date,
      military_id: person.military_id,
      unit: person.unit,
      phone: person.phone,
      current_status: person.current_status,
      fitness_category: person.fitness_category,
      fitness_category_date: person.fitness_category_date,
      notes: person.notes,
      created_at: now,
      updated_at: now,
    });
    Ok(id)
  }

  fn update_person(&mut self, id: Uuid, changes: &PersonChanges) -> Result<(), MemoryError> {
    self.online()?;
    let person = self.persons.iter_mut().find(|p| p.id == id).ok_or(MemoryError::Missing(id))?;
    changes.apply_to(person);
    person.updated_at = Utc::now();
    Ok(())
  }

  fn append_movement(&mut self, m: NewMovement) -> Result<(), MemoryError> {
    self.online()?;
    if self.reject_movements {
      return Err(MemoryError::MovementRejected);
    }
    self.movements.push(Movement {
      id:                   Uuid::new_v4(),
      person_id:            m.person_id,
      kind:                 m.kind,
      start_date:           m.start_date,
      end_date:             m.end_date,
      destination:          m.destination,
      vmo:                  m.vmo,
      expected_return_date: m.expected_return_date,
      notes:                m.notes,
      created_at:           Utc::now(),
    });
    Ok(())
  }

  fn find_open_movement(&mut self, person_id: Uuid, kind: MovementKind) -> Result<bool, MemoryError> {
    self.online()?;
    Ok(self.movements.iter().any(|m| m.person_id == person_id && m.kind == kind && m.is_open()))
  }

  fn has_movement_on(
    &mut self,
    person_id: Uuid,
    kind: MovementKind,
    date: NaiveDate,
  ) -> Result<bool, MemoryError> {
    self.online()?;
    Ok(
      self
        .movements
        .iter()
        .any(|m| m.person_id == person_id && m.kind == kind && m.start_date == date),
    )
  }

  fn append_checkup(&mut self, c: NewCheckup) -> Result<(), MemoryError> {
    self.online()?;
    self.checkups.push(Checkup {
      id:               Uuid::new_v4(),
      person_id:        c.person_id,
      checkup_date:     c.checkup_date,
      diagnosis:        c.diagnosis,
      fitness_category: c.fitness_category,
      doctor_specialty: c.doctor_specialty,
      recommendations:  c.recommendations,
      notes:            c.notes,
      created_at:       Utc::now(),
    });
    Ok(())
  }

  fn begin_row(&mut self) -> Result<(), MemoryError> {
    self.online()?;
    self.savepoints.push((self.persons.clone(), self.movements.clone(), self.checkups.clone()));
    Ok(())
  }

  fn finish_row(&mut self, keep: bool) -> Result<(), MemoryError> {
    let snapshot = self.savepoints.pop();
    if !keep {
      if let Some((persons, movements, checkups)) = snapshot {
        self.persons = persons;
        self.movements = movements;
        self.checkups = checkups;
      }
    }
    Ok(())
  }

  fn is_infrastructure(err: &MemoryError) -> bool { matches!(err, MemoryError::Offline) }
}
