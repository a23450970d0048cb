//! Header inference: free-text column titles → semantic field slots.
//!
//! Each header is lower-cased, trimmed and tested against an ordered list of
//! substring rules. The first rule that matches claims the column for its
//! field. When several columns claim the same field, the rightmost one wins.

use std::collections::HashMap;

use crate::workbook::Cell;

/// A semantic column slot recognised in roster sheets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
  FullName,
  PersonalNumber,
  Unit,
  Rank,
  FitnessDate,
  BirthDate,
  ArrivalDate,
  ExclusionDate,
  LeaveDays,
  FitnessCategory,
  Involvement,
  PvdStorage,
  PvdCount,
  MilitaryId,
  ExclusionReason,
  IssueStatus,
  Status,
  Vmo,
  Diagnosis,
  Notes,
  Destination,
  Phone,
}

type Rule = (Field, fn(&str) -> bool);

/// Ordered rules; order matters because many titles share substrings
/// (e.g. "подразделение" contains "др", which would otherwise read as a
/// birth-date column).
const RULES: &[Rule] = &[
  (Field::FullName, |h| h.contains("фио") || h.contains("фамилия") || h.contains("имя")),
  (Field::PersonalNumber, |h| h.contains("личный номер") || h.contains("личн")),
  (Field::Unit, |h| h.contains("подразделение")),
  (Field::Rank, |h| h.contains("звание") || h.contains("ранг")),
  (Field::FitnessDate, |h| {
    h.contains("дата") && (h.contains("категор") || h.contains("ввк") || h.contains("вкк"))
  }),
  (Field::BirthDate, |h| {
    h.contains("дата рождения") || h.contains("др") || h.contains("рождения")
  }),
  (Field::ArrivalDate, |h| h.contains("дата прибытия") || h.contains("прибытие")),
  (Field::ExclusionDate, |h| h.contains("срок исключения") || h.contains("срок окончания")),
  (Field::LeaveDays, |h| h.contains("суток") || (h.contains("срок") && h.contains("отпуск"))),
  (Field::FitnessCategory, |h| {
    h.contains("категория") && (h.contains("годн") || h.contains("вкк"))
  }),
  (Field::Involvement, |h| h.contains("привлечение")),
  (Field::PvdStorage, |h| h.contains("склад") && h.contains("ивд")),
  (Field::PvdCount, |h| h.contains("количест") && h.contains("ивд")),
  (Field::MilitaryId, |h| h.contains("военный билет") || h.contains("вб")),
  (Field::ExclusionReason, |h| h.contains("исключение") && h.contains("должности")),
  (Field::IssueStatus, |h| h.contains("проблем") && h.contains("решени")),
  (Field::Status, |h| h.contains("статус") || h.contains("положение")),
  (Field::Vmo, |h| h.contains("вмо")),
  (Field::Diagnosis, |h| h.contains("диагноз")),
  (Field::Notes, |h| {
    h.contains("комментарий")
      || h.contains("примечание")
      || h.contains("заметки")
      || h.contains("ссылка")
  }),
  (Field::Destination, |h| h.contains("назначени") || h.contains("куда")),
  (Field::Phone, |h| h.contains("телефон")),
];

/// Classify one header title, if any rule claims it.
pub fn classify_header(title: &str) -> Option<Field> {
  let h = title.trim().to_lowercase();
  if h.is_empty() {
    return None;
  }
  RULES.iter().find(|(_, matches)| matches(&h)).map(|(field, _)| *field)
}

/// Mapping from field slot to zero-based column index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
  columns: HashMap<Field, usize>,
}

impl ColumnMap {
  pub fn index(&self, field: Field) -> Option<usize> { self.columns.get(&field).copied() }

  pub fn contains(&self, field: Field) -> bool { self.columns.contains_key(&field) }

  pub fn len(&self) -> usize { self.columns.len() }

  pub fn is_empty(&self) -> bool { self.columns.is_empty() }

  /// The cell for `field` in `row`, or `None` when the field is unmapped,
  /// the row is too short, or the cell is blank.
  pub fn cell<'r>(&self, field: Field, row: &'r [Cell]) -> Option<&'r Cell> {
    self
      .index(field)
      .and_then(|i| row.get(i))
      .filter(|c| !c.is_blank())
  }

  /// Trimmed text of the cell for `field`, see [`ColumnMap::cell`].
  pub fn text(&self, field: Field, row: &[Cell]) -> Option<String> {
    self.cell(field, row).and_then(Cell::text)
  }
}

/// Infer the column mapping from a sheet's header row.
pub fn infer_columns(header: &[Cell]) -> ColumnMap {
  let mut columns = HashMap::new();
  for (i, cell) in header.iter().enumerate() {
    let Some(title) = cell.text() else { continue };
    if let Some(field) = classify_header(&title) {
      columns.insert(field, i);
    }
  }
  ColumnMap { columns }
}
