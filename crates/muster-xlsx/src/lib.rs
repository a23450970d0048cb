//! Spreadsheet codec for Muster.
//!
//! Decodes `.xlsx`, `.xls`, `.xlsb` and `.ods` documents from memory into a
//! [`muster_core::workbook::Workbook`]. Only cell values are read; formulas
//! arrive already evaluated.

pub mod error;

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{NaiveDate, NaiveDateTime};
pub use error::{Error, Result};
use muster_core::workbook::{Cell, Workbook, Worksheet};

/// Decode a spreadsheet document held in memory.
pub fn read(bytes: &[u8]) -> Result<Workbook> {
  let mut book = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(Error::Open)?;

  let names: Vec<String> = book.sheet_names().to_vec();
  let mut sheets = Vec::with_capacity(names.len());
  for name in names {
    let range = book
      .worksheet_range(&name)
      .map_err(|source| Error::Sheet { sheet: name.clone(), source })?;

    // Ranges start at the first used cell; keep absolute row numbers.
    let first_row = range.start().map_or(1, |(row, _)| row as usize + 1);
    let rows: Vec<Vec<Cell>> = range.rows().map(|r| r.iter().map(cell).collect()).collect();
    tracing::debug!(sheet = %name, rows = rows.len(), first_row, "decoded sheet");

    sheets.push(Worksheet { name, first_row, rows });
  }

  Ok(Workbook { sheets })
}

fn cell(data: &Data) -> Cell {
  match data {
    Data::Empty | Data::Error(_) => Cell::Empty,
    Data::String(s) => Cell::Text(s.clone()),
    Data::Int(i) => Cell::Number(*i as f64),
    Data::Float(f) => Cell::Number(*f),
    Data::Bool(b) => Cell::Bool(*b),
    Data::DateTime(dt) => match dt.as_datetime() {
      Some(dt) => Cell::DateTime(dt),
      None => Cell::Number(dt.as_f64()),
    },
    Data::DateTimeIso(s) => iso_datetime(s).map_or_else(|| Cell::Text(s.clone()), Cell::DateTime),
    Data::DurationIso(s) => Cell::Text(s.clone()),
  }
}

fn iso_datetime(s: &str) -> Option<NaiveDateTime> {
  NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
    .ok()
    .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok().map(|d| d.and_time(chrono::NaiveTime::MIN)))
}
