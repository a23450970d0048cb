//! Format-independent view of a spreadsheet: named sheets of typed cells.
//!
//! Produced by the `muster-xlsx` codec; consumed by [`crate::import`].
//! Formulas are already evaluated; only values are kept.

use chrono::NaiveDateTime;

/// A single cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
  #[default]
  Empty,
  Text(String),
  Number(f64),
  Bool(bool),
  DateTime(NaiveDateTime),
}

impl Cell {
  /// True for empty cells and text that is only whitespace.
  pub fn is_blank(&self) -> bool {
    match self {
      Cell::Empty => true,
      Cell::Text(s) => s.trim().is_empty(),
      _ => false,
    }
  }

  /// The trimmed textual form of the cell, or `None` when blank.
  ///
  /// Whole numbers lose their fractional part so that a personal number
  /// typed as `123` and stored by the spreadsheet as `123.0` reads as `"123"`.
  pub fn text(&self) -> Option<String> {
    let s = match self {
      Cell::Empty => return None,
      Cell::Text(s) => s.trim().to_owned(),
      Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
      Cell::Number(n) => n.to_string(),
      Cell::Bool(b) => b.to_string(),
      Cell::DateTime(dt) => {
        if dt.time() == chrono::NaiveTime::MIN {
          dt.date().to_string()
        } else {
          dt.to_string()
        }
      }
    };
    if s.is_empty() { None } else { Some(s) }
  }
}

impl From<&str> for Cell {
  fn from(s: &str) -> Self { Cell::Text(s.to_owned()) }
}

/// One sheet of a workbook.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Worksheet {
  pub name:      String,
  /// 1-based spreadsheet row number of `rows[0]`.
  pub first_row: usize,
  /// Rows in sheet order; the first row holds the column headers.
  pub rows:      Vec<Vec<Cell>>,
}

impl Worksheet {
  pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
    Self { name: name.into(), first_row: 1, rows }
  }

  pub fn header(&self) -> Option<&[Cell]> { self.rows.first().map(Vec::as_slice) }

  /// Data rows paired with their 1-based spreadsheet row numbers.
  pub fn data_rows(&self) -> impl Iterator<Item = (usize, &[Cell])> + '_ {
    self
      .rows
      .iter()
      .enumerate()
      .skip(1)
      .map(|(i, row)| (self.first_row + i, row.as_slice()))
  }
}

/// A decoded spreadsheet document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
  pub sheets: Vec<Worksheet>,
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;

  #[test]
  fn whole_numbers_render_without_fraction() {
    assert_eq!(Cell::Number(123.0).text().as_deref(), Some("123"));
    assert_eq!(Cell::Number(1.5).text().as_deref(), Some("1.5"));
  }

  #[test]
  fn blank_text_has_no_value() {
    assert!(Cell::Text("   ".into()).is_blank());
    assert_eq!(Cell::Text("  ".into()).text(), None);
    assert_eq!(Cell::Text(" x ".into()).text().as_deref(), Some("x"));
  }

  #[test]
  fn midnight_datetime_renders_as_date() {
    let dt = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(Cell::DateTime(dt).text().as_deref(), Some("2024-01-02"));
  }

  #[test]
  fn data_rows_are_numbered_from_the_sheet() {
    let mut sheet = Worksheet::new("s", vec![vec!["h".into()], vec!["a".into()], vec!["b".into()]]);
    sheet.first_row = 3;
    let numbers: Vec<usize> = sheet.data_rows().map(|(n, _)| n).collect();
    assert_eq!(numbers, vec![4, 5]);
  }
}
