//! Row reconciliation: one spreadsheet row → person upsert plus derived
//! timeline records.
//!
//! A row is first parsed into a [`ParsedRow`] without touching the store,
//! then applied inside a row savepoint. The result is a [`RowOutcome`]; an
//! `Err` is only returned for infrastructure failures that should abort the
//! whole import.

use chrono::{Days, NaiveDate};
use uuid::Uuid;

use crate::{
  header::{ColumnMap, Field},
  movement::{MovementKind, NewCheckup, NewMovement},
  normalize::{parse_date, parse_day_count, parse_fitness_category, parse_rank, parse_status},
  person::{NewPerson, PersonChanges},
  sheet::SheetKind,
  store::RecordStore,
  workbook::Cell,
};

/// Note recorded on arrival movements created by an import.
pub const ARRIVAL_NOTE: &str = "Прибытие из Excel импорта";

/// Diagnosis recorded on imported checkups when the row has none.
pub const DEFAULT_DIAGNOSIS: &str = "Импорт из Excel";

/// Per-sheet inputs shared by every row.
#[derive(Debug, Clone, Copy)]
pub struct RowContext<'a> {
  pub sheet_name: &'a str,
  pub sheet_kind: SheetKind,
  /// Date given to derived movements and undated checkups.
  pub today:      NaiveDate,
}

/// What happened to one row.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
  Imported(RowEffects),
  /// No full name; the row is treated as decoration.
  Skipped,
  /// The row was rejected and its writes rolled back.
  Failed(String),
}

/// Writes performed for an imported row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowEffects {
  pub person_id: Uuid,
  pub created:   bool,
  /// Kinds of the movements appended, in order.
  pub movements: Vec<MovementKind>,
  pub checkup:   bool,
}

// ─── Parsing ─────────────────────────────────────────────────────────────────

/// A row's values after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
  pub personal_number: Option<String>,
  pub full_name:       String,
  /// Person fields for the mapped columns only.
  pub changes:         PersonChanges,
  pub arrival_date:    Option<NaiveDate>,
  pub fitness_date:    Option<NaiveDate>,
  pub leave_days:      Option<u32>,
  pub vmo:             Option<String>,
  pub destination:     Option<String>,
  pub diagnosis:       Option<String>,
  pub notes:           Option<String>,
  pub pvd_storage:     Option<String>,
  pub pvd_count:       Option<String>,
}

impl ParsedRow {
  /// Normalize `row` through `map`.
  ///
  /// `Ok(None)` means the row has no full name and should be skipped.
  /// `Err` carries a message for values that are present but unusable.
  pub fn parse(map: &ColumnMap, row: &[Cell]) -> Result<Option<Self>, String> {
    let Some(full_name) = map.text(Field::FullName, row) else {
      return Ok(None);
    };

    // `Some(..)` only when the column exists, so unmapped fields keep
    // whatever the store already holds.
    let mapped = |field: Field| map.contains(field).then(|| map.text(field, row));
    let mapped_date = |field: Field| map.contains(field).then(|| map.cell(field, row).and_then(parse_date));

    let leave_days = match map.cell(Field::LeaveDays, row) {
      None => None,
      Some(cell) => match parse_day_count(cell) {
        Some(days) => Some(days),
        None => {
          let shown = cell.text().unwrap_or_default();
          return Err(format!("invalid leave duration {shown:?}"));
        }
      },
    };

    let fitness_date = mapped_date(Field::FitnessDate);
    let notes = mapped(Field::Notes);

    let changes = PersonChanges {
      full_name: Some(full_name.clone()),
      rank: mapped(Field::Rank).map(|s| s.as_deref().and_then(parse_rank)),
      birth_date: mapped_date(Field::BirthDate),
      military_id: mapped(Field::MilitaryId),
      unit: mapped(Field::Unit),
      phone: mapped(Field::Phone),
      current_status: mapped(Field::Status).map(|s| parse_status(s.as_deref().unwrap_or_default())),
      fitness_category: mapped(Field::FitnessCategory)
        .map(|s| s.as_deref().and_then(parse_fitness_category)),
      fitness_category_date: fitness_date,
      notes: notes.clone(),
    };

    Ok(Some(Self {
      personal_number: map.text(Field::PersonalNumber, row),
      full_name,
      changes,
      arrival_date: map.cell(Field::ArrivalDate, row).and_then(parse_date),
      fitness_date: fitness_date.flatten(),
      leave_days,
      vmo: map.text(Field::Vmo, row),
      destination: map.text(Field::Destination, row),
      diagnosis: map.text(Field::Diagnosis, row),
      notes: notes.flatten(),
      pvd_storage: map.text(Field::PvdStorage, row),
      pvd_count: map.text(Field::PvdCount, row),
    }))
  }

  /// Insert payload; unmapped fields take their defaults.
  pub fn new_person(&self) -> NewPerson {
    let c = &self.changes;
    NewPerson {
      personal_number:       self.personal_number.clone(),
      full_name:             self.full_name.clone(),
      rank:                  c.rank.flatten(),
      birth_date:            c.birth_date.flatten(),
      military_id:           c.military_id.clone().flatten(),
      unit:                  c.unit.clone().flatten(),
      phone:                 c.phone.clone().flatten(),
      current_status:        c.current_status.unwrap_or_default(),
      fitness_category:      c.fitness_category.flatten(),
      fitness_category_date: c.fitness_category_date.flatten(),
      notes:                 self.notes.clone(),
    }
  }

  /// The PVD storage annotation, when either PVD column has a value.
  pub fn pvd_annotation(&self) -> Option<String> {
    let detail = match (&self.pvd_storage, &self.pvd_count) {
      (Some(s), Some(n)) => format!("Склад ИВД: {s}, Количество: {n}"),
      (Some(v), None) | (None, Some(v)) => v.clone(),
      (None, None) => return None,
    };
    Some(format!("ИВД: {detail}"))
  }
}

/// Append `annotation` to `notes` with ". " unless one of the ". "-separated
/// segments already equals it.
pub fn merge_note(notes: Option<&str>, annotation: &str) -> String {
  match notes {
    Some(n) if n.split(". ").any(|segment| segment == annotation) => n.to_owned(),
    Some(n) if !n.is_empty() => format!("{n}. {annotation}"),
    _ => annotation.to_owned(),
  }
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// Reconcile one data row against `store`.
pub fn reconcile_row<S: RecordStore>(
  store: &mut S,
  map: &ColumnMap,
  row: &[Cell],
  ctx: &RowContext<'_>,
) -> Result<RowOutcome, S::Error> {
  let parsed = match ParsedRow::parse(map, row) {
    Ok(Some(parsed)) => parsed,
    Ok(None) => return Ok(RowOutcome::Skipped),
    Err(message) => return Ok(RowOutcome::Failed(message)),
  };

  store.begin_row()?;
  match apply(store, &parsed, ctx) {
    Ok(Ok(effects)) => {
      store.finish_row(true)?;
      Ok(RowOutcome::Imported(effects))
    }
    Ok(Err(message)) => {
      store.finish_row(false)?;
      Ok(RowOutcome::Failed(message))
    }
    Err(err) if S::is_infrastructure(&err) => Err(err),
    Err(err) => {
      store.finish_row(false)?;
      Ok(RowOutcome::Failed(err.to_string()))
    }
  }
}

/// Store writes for a parsed row. The inner `Err` is a row-level failure
/// detected after writes began.
fn apply<S: RecordStore>(
  store: &mut S,
  row: &ParsedRow,
  ctx: &RowContext<'_>,
) -> Result<Result<RowEffects, String>, S::Error> {
  let existing = match &row.personal_number {
    Some(number) => store.find_person_by_personal_number(number)?,
    None => {
      let mut named = store.find_persons_by_full_name(&row.full_name)?;
      if named.len() > 1 {
        return Ok(Err(format!(
          "{} persons are named {:?}; add a personal number to tell them apart",
          named.len(),
          row.full_name
        )));
      }
      named.pop()
    }
  };

  let (person_id, stored_notes, created) = match existing {
    Some(person) => {
      store.update_person(person.id, &row.changes)?;
      (person.id, person.notes, false)
    }
    None => (store.insert_person(row.new_person())?, None, true),
  };

  let mut effects = RowEffects { person_id, created, movements: Vec::new(), checkup: false };

  if let Some(date) = row.arrival_date {
    if !store.has_movement_on(person_id, MovementKind::Arrival, date)? {
      let mut movement = NewMovement::new(person_id, MovementKind::Arrival, date);
      movement.notes = Some(ARRIVAL_NOTE.to_owned());
      store.append_movement(movement)?;
      effects.movements.push(MovementKind::Arrival);
    }
  }

  if let Some(kind) = row.changes.current_status.and_then(|s| s.movement_kind()) {
    let mut movement = NewMovement::new(person_id, kind, ctx.today);
    movement.vmo = row.vmo.clone();
    movement.destination = row.destination.clone();
    movement.notes = row.notes.clone();
    if let Err(message) = set_expected_return(&mut movement, row.leave_days) {
      return Ok(Err(message));
    }
    if append_if_none_open(store, movement)? {
      effects.movements.push(kind);
    }
  }

  if let Some(Some(category)) = row.changes.fitness_category {
    store.append_checkup(NewCheckup {
      person_id,
      checkup_date: row.fitness_date.unwrap_or(ctx.today),
      diagnosis: row.diagnosis.clone().unwrap_or_else(|| DEFAULT_DIAGNOSIS.to_owned()),
      fitness_category: Some(category),
      doctor_specialty: None,
      recommendations: None,
      notes: row.notes.clone(),
    })?;
    effects.checkup = true;
  }

  if let Some(annotation) = row.pvd_annotation() {
    // After the main write the person holds the row's notes when that
    // column is mapped, and the stored notes otherwise.
    let current = match &row.changes.notes {
      Some(notes) => notes.clone(),
      None => stored_notes,
    };
    let merged = merge_note(current.as_deref(), &annotation);
    if current.as_deref() != Some(merged.as_str()) {
      let changes = PersonChanges { notes: Some(Some(merged)), ..Default::default() };
      store.update_person(person_id, &changes)?;
    }
  }

  if let Some(kind) = ctx.sheet_kind.implied_movement() {
    let mut movement = NewMovement::new(person_id, kind, ctx.today);
    movement.notes = row.notes.clone().or_else(|| ctx.sheet_kind.default_note(ctx.sheet_name));
    movement.destination = row.destination.clone();
    if kind == MovementKind::Hospitalized {
      movement.vmo = row.vmo.clone();
    }
    if let Err(message) = set_expected_return(&mut movement, row.leave_days) {
      return Ok(Err(message));
    }
    if append_if_none_open(store, movement)? {
      effects.movements.push(kind);
    }
  }

  Ok(Ok(effects))
}

fn set_expected_return(movement: &mut NewMovement, leave_days: Option<u32>) -> Result<(), String> {
  if movement.kind != MovementKind::Leave {
    return Ok(());
  }
  let Some(days) = leave_days else { return Ok(()) };
  let expected = movement
    .start_date
    .checked_add_days(Days::new(u64::from(days)))
    .ok_or_else(|| format!("leave of {days} days runs past the calendar"))?;
  movement.expected_return_date = Some(expected);
  Ok(())
}

/// Append `movement` unless the person already has an open one of its kind.
fn append_if_none_open<S: RecordStore>(store: &mut S, movement: NewMovement) -> Result<bool, S::Error> {
  if store.find_open_movement(movement.person_id, movement.kind)? {
    tracing::debug!(person = %movement.person_id, kind = %movement.kind, "open movement exists");
    return Ok(false);
  }
  store.append_movement(movement)?;
  Ok(true)
}
