//! Synchronous queries over a borrowed connection.
//!
//! Everything here runs on the `tokio_rusqlite` worker thread, either from a
//! single [`crate::SqliteStore`] call or inside an import transaction.

use chrono::{NaiveDate, Utc};
use muster_core::{
  movement::{Checkup, Movement, MovementKind, NewCheckup, NewMovement},
  person::{NewPerson, Person, PersonChanges, Status},
  store::{PersonnelQuery, PersonnelRecord, Stats},
};
use rusqlite::{Connection, ErrorCode, OptionalExtension as _};
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    CHECKUP_COLUMNS, MOVEMENT_COLUMNS, PERSON_COLUMNS, RawCheckup, RawMovement, RawPerson,
    encode_date, encode_dt, encode_uuid,
  },
};

// ─── Persons ─────────────────────────────────────────────────────────────────

fn person_where(conn: &Connection, condition: &str, param: &str) -> Result<Option<Person>> {
  let sql = format!("SELECT {PERSON_COLUMNS} FROM personnel WHERE {condition} LIMIT 1");
  let raw = conn.query_row(&sql, [param], RawPerson::from_row).optional()?;
  raw.map(RawPerson::into_person).transpose()
}

pub fn get_person(conn: &Connection, id: Uuid) -> Result<Option<Person>> {
  person_where(conn, "id = ?1", &encode_uuid(id))
}

pub fn find_person_by_number(conn: &Connection, number: &str) -> Result<Option<Person>> {
  person_where(conn, "personal_number = ?1", number)
}

/// Every person with this exact name, oldest first.
pub fn find_persons_by_name(conn: &Connection, full_name: &str) -> Result<Vec<Person>> {
  let sql = format!("SELECT {PERSON_COLUMNS} FROM personnel WHERE full_name = ?1 ORDER BY rowid");
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map([full_name], RawPerson::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  raws.into_iter().map(RawPerson::into_person).collect()
}

pub fn insert_person(conn: &Connection, input: NewPerson) -> Result<Person> {
  let now = Utc::now();
  let person = Person {
    id:                    Uuid::new_v4(),
    personal_number:       input.personal_number,
    full_name:             input.full_name,
    rank:                  input.rank,
    birth_date:            input.birth_date,
    military_id:           input.military_id,
    unit:                  input.unit,
    phone:                 input.phone,
    current_status:        input.current_status,
    fitness_category:      input.fitness_category,
    fitness_category_date: input.fitness_category_date,
    notes:                 input.notes,
    created_at:            now,
    updated_at:            now,
  };

  let inserted = conn.execute(
    &format!("INSERT INTO personnel ({PERSON_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"),
    rusqlite::params![
      encode_uuid(person.id),
      person.personal_number,
      person.full_name,
      person.rank.map(|r| r.as_str()),
      person.birth_date.map(encode_date),
      person.military_id,
      person.unit,
      person.phone,
      person.current_status.as_str(),
      person.fitness_category.map(|c| c.as_str()),
      person.fitness_category_date.map(encode_date),
      person.notes,
      encode_dt(person.created_at),
      encode_dt(person.updated_at),
    ],
  );

  match (inserted, &person.personal_number) {
    (Ok(_), _) => Ok(person),
    (Err(rusqlite::Error::SqliteFailure(e, _)), Some(number))
      if e.code == ErrorCode::ConstraintViolation =>
    {
      Err(Error::DuplicatePersonalNumber(number.clone()))
    }
    (Err(e), _) => Err(e.into()),
  }
}

/// Write the set fields of `changes`. Returns `false` if no such person.
pub fn update_person(conn: &Connection, id: Uuid, changes: &PersonChanges) -> Result<bool> {
  let mut sets: Vec<(&str, Option<String>)> = Vec::new();
  if let Some(v) = &changes.full_name {
    sets.push(("full_name", Some(v.clone())));
  }
  if let Some(v) = changes.rank {
    sets.push(("rank", v.map(|r| r.as_str().to_owned())));
  }
  if let Some(v) = changes.birth_date {
    sets.push(("birth_date", v.map(encode_date)));
  }
  if let Some(v) = &changes.military_id {
    sets.push(("military_id", v.clone()));
  }
  if let Some(v) = &changes.unit {
    sets.push(("unit", v.clone()));
  }
  if let Some(v) = &changes.phone {
    sets.push(("phone", v.clone()));
  }
  if let Some(v) = changes.current_status {
    sets.push(("current_status", Some(v.as_str().to_owned())));
  }
  if let Some(v) = changes.fitness_category {
    sets.push(("fitness_category", v.map(|c| c.as_str().to_owned())));
  }
  if let Some(v) = changes.fitness_category_date {
    sets.push(("fitness_category_date", v.map(encode_date)));
  }
  if let Some(v) = &changes.notes {
    sets.push(("notes", v.clone()));
  }
  sets.push(("updated_at", Some(encode_dt(Utc::now()))));

  let assignments = sets
    .iter()
    .enumerate()
    .map(|(i, (column, _))| format!("{column} = ?{}", i + 1))
    .collect::<Vec<_>>()
    .join(", ");
  let sql = format!("UPDATE personnel SET {assignments} WHERE id = ?{}", sets.len() + 1);

  let mut values: Vec<Option<String>> = sets.into_iter().map(|(_, v)| v).collect();
  values.push(Some(encode_uuid(id)));

  let updated = conn.execute(&sql, rusqlite::params_from_iter(values))?;
  Ok(updated > 0)
}

pub fn list_personnel(conn: &Connection, query: &PersonnelQuery) -> Result<Vec<Person>> {
  let sql = format!(
    "SELECT {PERSON_COLUMNS} FROM personnel
     WHERE (?1 IS NULL OR unit = ?1)
       AND (?2 IS NULL OR current_status = ?2)
     ORDER BY rowid DESC"
  );
  let mut stmt = conn.prepare(&sql)?;
  let raws = stmt
    .query_map(
      rusqlite::params![query.unit.as_deref(), query.status.map(Status::as_str)],
      RawPerson::from_row,
    )?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut persons = raws.into_iter().map(RawPerson::into_person).collect::<Result<Vec<_>>>()?;

  // SQLite's lower() only folds ASCII, so Cyrillic search is done here.
  if let Some(needle) = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
    let needle = needle.to_lowercase();
    persons.retain(|p| {
      p.full_name.to_lowercase().contains(&needle)
        || p.personal_number.as_deref().is_some_and(|n| n.to_lowercase().contains(&needle))
    });
  }
  Ok(persons)
}

pub fn list_units(conn: &Connection) -> Result<Vec<String>> {
  let mut stmt = conn.prepare(
    "SELECT DISTINCT unit FROM personnel WHERE unit IS NOT NULL AND unit != '' ORDER BY unit",
  )?;
  let units = stmt.query_map([], |row| row.get(0))?.collect::<rusqlite::Result<Vec<String>>>()?;
  Ok(units)
}

pub fn stats(conn: &Connection) -> Result<Stats> {
  let mut stmt = conn.prepare("SELECT current_status, COUNT(*) FROM personnel GROUP BY current_status")?;
  let counts = stmt
    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut stats = Stats::default();
  for (status, count) in counts {
    let count = count as u64;
    stats.total += count;
    match status.parse::<Status>()? {
      Status::Active => stats.active += count,
      Status::Pvd => stats.pvd += count,
      Status::Hospitalized => stats.hospitalized += count,
      Status::Leave => stats.leave += count,
      Status::Discharge => stats.discharged += count,
      _ => {}
    }
  }
  Ok(stats)
}

// ─── Timeline ────────────────────────────────────────────────────────────────

pub fn insert_movement(conn: &Connection, input: NewMovement) -> Result<Movement> {
  let movement = Movement {
    id:                   Uuid::new_v4(),
    person_id:            input.person_id,
    kind:                 input.kind,
    start_date:           input.start_date,
    end_date:             input.end_date,
    destination:          input.destination,
    vmo:                  input.vmo,
    expected_return_date: input.expected_return_date,
    notes:                input.notes,
    created_at:           Utc::now(),
  };

  conn.execute(
    &format!("INSERT INTO movements ({MOVEMENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"),
    rusqlite::params![
      encode_uuid(movement.id),
      encode_uuid(movement.person_id),
      movement.kind.as_str(),
      encode_date(movement.start_date),
      movement.end_date.map(encode_date),
      movement.destination,
      movement.vmo,
      movement.expected_return_date.map(encode_date),
      movement.notes,
      encode_dt(movement.created_at),
    ],
  )?;
  Ok(movement)
}

pub fn insert_checkup(conn: &Connection, input: NewCheckup) -> Result<Checkup> {
  let checkup = Checkup {
    id:               Uuid::new_v4(),
    person_id:        input.person_id,
    checkup_date:     input.checkup_date,
    diagnosis:        input.diagnosis,
    fitness_category: input.fitness_category,
    doctor_specialty: input.doctor_specialty,
    recommendations:  input.recommendations,
    notes:            input.notes,
    created_at:       Utc::now(),
  };

  conn.execute(
    &format!("INSERT INTO checkups ({CHECKUP_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
    rusqlite::params![
      encode_uuid(checkup.id),
      encode_uuid(checkup.person_id),
      encode_date(checkup.checkup_date),
      checkup.diagnosis,
      checkup.fitness_category.map(|c| c.as_str()),
      checkup.doctor_specialty,
      checkup.recommendations,
      checkup.notes,
      encode_dt(checkup.created_at),
    ],
  )?;
  Ok(checkup)
}

pub fn has_open_movement(conn: &Connection, person_id: Uuid, kind: MovementKind) -> Result<bool> {
  let found = conn
    .query_row(
      "SELECT 1 FROM movements WHERE person_id = ?1 AND kind = ?2 AND end_date IS NULL LIMIT 1",
      rusqlite::params![encode_uuid(person_id), kind.as_str()],
      |_| Ok(()),
    )
    .optional()?;
  Ok(found.is_some())
}

pub fn has_movement_on(
  conn: &Connection,
  person_id: Uuid,
  kind: MovementKind,
  date: NaiveDate,
) -> Result<bool> {
  let found = conn
    .query_row(
      "SELECT 1 FROM movements WHERE person_id = ?1 AND kind = ?2 AND start_date = ?3 LIMIT 1",
      rusqlite::params![encode_uuid(person_id), kind.as_str(), encode_date(date)],
      |_| Ok(()),
    )
    .optional()?;
  Ok(found.is_some())
}

/// The person and their timeline, newest entries first.
pub fn personnel_record(conn: &Connection, id: Uuid) -> Result<Option<PersonnelRecord>> {
  let Some(person) = get_person(conn, id)? else { return Ok(None) };
  let id_str = encode_uuid(id);

  let mut stmt = conn.prepare(&format!(
    "SELECT {MOVEMENT_COLUMNS} FROM movements WHERE person_id = ?1 ORDER BY start_date DESC, rowid DESC"
  ))?;
  let movements = stmt
    .query_map([&id_str], RawMovement::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?
    .into_iter()
    .map(RawMovement::into_movement)
    .collect::<Result<Vec<_>>>()?;

  let mut stmt = conn.prepare(&format!(
    "SELECT {CHECKUP_COLUMNS} FROM checkups WHERE person_id = ?1 ORDER BY checkup_date DESC, rowid DESC"
  ))?;
  let checkups = stmt
    .query_map([&id_str], RawCheckup::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?
    .into_iter()
    .map(RawCheckup::into_checkup)
    .collect::<Result<Vec<_>>>()?;

  Ok(Some(PersonnelRecord { person, movements, checkups }))
}

/// Append a movement; leave, hospitalization and discharge also move the
/// person's current status. `None` if the person does not exist.
pub fn add_movement(conn: &mut Connection, input: NewMovement) -> Result<Option<Movement>> {
  let tx = conn.transaction()?;
  if get_person(&tx, input.person_id)?.is_none() {
    return Ok(None);
  }
  let status = input.kind.resulting_status();
  let movement = insert_movement(&tx, input)?;
  if let Some(status) = status {
    let changes = PersonChanges { current_status: Some(status), ..Default::default() };
    update_person(&tx, movement.person_id, &changes)?;
  }
  tx.commit()?;
  Ok(Some(movement))
}

/// Append a checkup; a fitness category also becomes the person's current
/// category. `None` if the person does not exist.
pub fn add_checkup(conn: &mut Connection, input: NewCheckup) -> Result<Option<Checkup>> {
  let tx = conn.transaction()?;
  if get_person(&tx, input.person_id)?.is_none() {
    return Ok(None);
  }
  let checkup = insert_checkup(&tx, input)?;
  if let Some(category) = checkup.fitness_category {
    let changes = PersonChanges {
      fitness_category: Some(Some(category)),
      fitness_category_date: Some(Some(checkup.checkup_date)),
      ..Default::default()
    };
    update_person(&tx, checkup.person_id, &changes)?;
  }
  tx.commit()?;
  Ok(Some(checkup))
}
