//! Core types and import logic for the Muster personnel registry.
//!
//! This crate is deliberately free of HTTP, spreadsheet-format, and database
//! dependencies. Storage backends implement the traits in [`store`]; the
//! spreadsheet codec produces a [`workbook::Workbook`].
//!
//! Import pipeline:
//!
//! ```text
//! Workbook ─┬─ per sheet: header::infer_columns + sheet::SheetKind::classify
//!           └─ per row:   normalize::* → reconcile::reconcile_row → RecordStore
//!                                               │
//!                                     import::ImportSummary
//! ```

pub mod error;
pub mod header;
pub mod import;
pub mod movement;
pub mod normalize;
pub mod person;
pub mod reconcile;
pub mod sheet;
pub mod store;
pub mod workbook;

pub use error::{Error, Result};
pub use import::{ImportError, ImportSummary, InvalidWorkbook, RowError, import_workbook};

#[cfg(test)]
mod testing;
