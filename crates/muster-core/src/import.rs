//! Workbook import orchestration.
//!
//! Validates the whole workbook up front, then walks every sheet and row in
//! order, handing each row to [`reconcile_row`]. Row-level failures are
//! collected into the [`ImportSummary`]; only store infrastructure errors
//! abort the run.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
  header::{Field, infer_columns},
  reconcile::{RowContext, RowOutcome, reconcile_row},
  sheet::SheetKind,
  store::RecordStore,
  workbook::{Workbook, Worksheet},
};

/// A workbook that cannot be imported at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidWorkbook {
  #[error("workbook contains no sheets")]
  NoSheets,

  #[error("sheet {sheet:?} is empty or contains only headers")]
  EmptySheet { sheet: String },
}

#[derive(Debug, Error)]
pub enum ImportError<E> {
  #[error(transparent)]
  Invalid(#[from] InvalidWorkbook),

  #[error("store failure: {0}")]
  Store(#[source] E),
}

/// One rejected row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
  pub sheet:   String,
  /// 1-based spreadsheet row number; the header is row 1.
  pub row:     usize,
  pub message: String,
}

impl fmt::Display for RowError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "[{}] row {}: {}", self.sheet, self.row, self.message)
  }
}

/// Result of a completed import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
  /// Rows reconciled successfully.
  pub imported:         usize,
  /// Rows without a full name.
  pub skipped:          usize,
  pub errors:           Vec<RowError>,
  pub sheets_processed: usize,
}

/// Reject workbooks with no sheets or with a sheet holding no data rows.
pub fn validate(workbook: &Workbook) -> Result<(), InvalidWorkbook> {
  if workbook.sheets.is_empty() {
    return Err(InvalidWorkbook::NoSheets);
  }
  for sheet in &workbook.sheets {
    let has_data = sheet.data_rows().any(|(_, row)| row.iter().any(|c| !c.is_blank()));
    if !has_data {
      return Err(InvalidWorkbook::EmptySheet { sheet: sheet.name.clone() });
    }
  }
  Ok(())
}

/// Import every sheet of `workbook` into `store`.
///
/// The caller owns the surrounding transaction: commit on `Ok`, roll back on
/// `Err`. Nothing is written when validation fails.
pub fn import_workbook<S: RecordStore>(
  store: &mut S,
  workbook: &Workbook,
  today: NaiveDate,
) -> Result<ImportSummary, ImportError<S::Error>> {
  validate(workbook)?;

  let mut summary = ImportSummary::default();
  for sheet in &workbook.sheets {
    import_sheet(store, sheet, today, &mut summary).map_err(ImportError::Store)?;
    summary.sheets_processed += 1;
  }

  tracing::info!(
    imported = summary.imported,
    skipped = summary.skipped,
    failed = summary.errors.len(),
    sheets = summary.sheets_processed,
    "import finished"
  );
  Ok(summary)
}

fn import_sheet<S: RecordStore>(
  store: &mut S,
  sheet: &Worksheet,
  today: NaiveDate,
  summary: &mut ImportSummary,
) -> Result<(), S::Error> {
  let map = infer_columns(sheet.header().unwrap_or_default());
  let ctx = RowContext { sheet_name: &sheet.name, sheet_kind: SheetKind::classify(&sheet.name), today };

  tracing::info!(sheet = %sheet.name, kind = ?ctx.sheet_kind, columns = map.len(), "importing sheet");
  if !map.contains(Field::FullName) {
    tracing::warn!(sheet = %sheet.name, "no full name column, skipping every row");
  }

  for (row_number, row) in sheet.data_rows() {
    match reconcile_row(store, &map, row, &ctx)? {
      RowOutcome::Imported(_) => summary.imported += 1,
      RowOutcome::Skipped => {
        tracing::debug!(sheet = %sheet.name, row = row_number, "row skipped");
        summary.skipped += 1;
      }
      RowOutcome::Failed(message) => {
        tracing::warn!(sheet = %sheet.name, row = row_number, %message, "row failed");
        summary.errors.push(RowError { sheet: sheet.name.clone(), row: row_number, message });
      }
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    movement::MovementKind,
    person::Status,
    testing::{MemoryStore, ymd},
    workbook::Cell,
  };

  fn sheet(name: &str, rows: &[&[&str]]) -> Worksheet {
    Worksheet::new(
      name,
      rows.iter().map(|r| r.iter().map(|v| Cell::from(*v)).collect()).collect(),
    )
  }

  fn today() -> NaiveDate { ymd(2024, 5, 10) }

  #[test]
  fn imports_every_sheet() {
    let workbook = Workbook {
      sheets: vec![
        sheet("Личный состав", &[&["Личный номер", "ФИО", "Статус"], &["1", "Иванов", ""], &[
          "2", "Петров", "отпуск",
        ]]),
        sheet("Госпиталь", &[&["Личный номер", "ФИО"], &["1", "Иванов"]]),
      ],
    };
    let mut store = MemoryStore::default();
    let summary = import_workbook(&mut store, &workbook, today()).unwrap();

    assert_eq!(summary.imported, 3);
    assert_eq!(summary.sheets_processed, 2);
    assert!(summary.errors.is_empty());
    assert_eq!(store.persons.len(), 2);
    let kinds: Vec<MovementKind> = store.movements.iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MovementKind::Leave, MovementKind::Hospitalized]);
    assert_eq!(store.persons[1].current_status, Status::Leave);
  }

  #[test]
  fn name_keyed_sheet_updates_the_numbered_roster_entry() {
    let workbook = Workbook {
      sheets: vec![
        sheet("Личный состав", &[&["Личный номер", "ФИО"], &["123", "Иванов И.И."]]),
        sheet("Отпуска", &[&["ФИО"], &["Иванов И.И."]]),
      ],
    };
    let mut store = MemoryStore::default();
    let summary = import_workbook(&mut store, &workbook, today()).unwrap();

    assert_eq!(summary.imported, 2);
    assert_eq!(store.persons.len(), 1);
    assert_eq!(store.persons[0].personal_number.as_deref(), Some("123"));
    assert_eq!(store.movements.len(), 1);
    assert_eq!(store.movements[0].kind, MovementKind::Leave);
    assert_eq!(store.movements[0].person_id, store.persons[0].id);
  }

  #[test]
  fn nameless_rows_are_skipped_silently() {
    let workbook = Workbook {
      sheets: vec![sheet("Лист1", &[&["ФИО", "Подразделение"], &["", "1 рота"], &["Орлов", "2 рота"]])],
    };
    let mut store = MemoryStore::default();
    let summary = import_workbook(&mut store, &workbook, today()).unwrap();
    assert_eq!(summary.imported, 1);
    assert_eq!(summary.skipped, 1);
    assert!(summary.errors.is_empty());
  }

  #[test]
  fn failed_rows_are_reported_and_later_rows_continue() {
    let workbook = Workbook {
      sheets: vec![sheet("Лист1", &[
        &["Личный номер", "ФИО"],
        &["10", "Первый"],
        &["13", "Второй"],
        &["14", "Третий"],
      ])],
    };
    let mut store = MemoryStore { reject_number: Some("13".into()), ..Default::default() };
    let summary = import_workbook(&mut store, &workbook, today()).unwrap();

    assert_eq!(summary.imported, 2);
    assert_eq!(summary.errors.len(), 1);
    let error = &summary.errors[0];
    assert_eq!(error.sheet, "Лист1");
    assert_eq!(error.row, 3);
    assert!(error.to_string().starts_with("[Лист1] row 3: "), "{error}");
    assert_eq!(store.persons.len(), 2);
  }

  #[test]
  fn header_only_sheet_is_rejected_before_writing() {
    let workbook = Workbook {
      sheets: vec![
        sheet("Лист1", &[&["ФИО"], &["Орлов"]]),
        sheet("Пустой", &[&["ФИО"], &["", ""]]),
      ],
    };
    let mut store = MemoryStore::default();
    let err = import_workbook(&mut store, &workbook, today()).unwrap_err();
    assert!(matches!(
      err,
      ImportError::Invalid(InvalidWorkbook::EmptySheet { ref sheet }) if sheet == "Пустой"
    ));
    assert!(store.persons.is_empty());
  }

  #[test]
  fn empty_workbook_is_rejected() {
    let mut store = MemoryStore::default();
    let err = import_workbook(&mut store, &Workbook::default(), today()).unwrap_err();
    assert!(matches!(err, ImportError::Invalid(InvalidWorkbook::NoSheets)));
  }

  #[test]
  fn sheet_without_name_column_still_counts() {
    let workbook = Workbook {
      sheets: vec![sheet("Склад", &[&["Наименование", "Количество"], &["Каска", "3"]])],
    };
    let mut store = MemoryStore::default();
    let summary = import_workbook(&mut store, &workbook, today()).unwrap();
    assert_eq!(summary.sheets_processed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.imported, 0);
  }

  #[test]
  fn row_numbers_follow_the_sheet_origin() {
    let mut s = sheet("Лист1", &[&["ФИО", "Срок отпуска (суток)"], &["Орлов", "долго"]]);
    s.first_row = 4;
    let mut store = MemoryStore::default();
    let summary = import_workbook(&mut store, &Workbook { sheets: vec![s] }, today()).unwrap();
    assert_eq!(summary.errors[0].row, 5);
  }

  #[test]
  fn infrastructure_failure_aborts() {
    let workbook = Workbook { sheets: vec![sheet("Лист1", &[&["ФИО"], &["Орлов"]])] };
    let mut store = MemoryStore { offline: true, ..Default::default() };
    let err = import_workbook(&mut store, &workbook, today()).unwrap_err();
    assert!(matches!(err, ImportError::Store(_)));
  }
}
