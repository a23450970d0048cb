//! Sheet classification by worksheet name.

use serde::{Deserialize, Serialize};

use crate::movement::MovementKind;

/// The implicit event type a worksheet represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SheetKind {
  /// Plain roster; no implied movement.
  #[default]
  Main,
  Leave,
  Hospitalized,
  Dispatch,
}

impl SheetKind {
  /// Case-insensitive substring match on the sheet name.
  pub fn classify(sheet_name: &str) -> Self {
    let name = sheet_name.to_lowercase();
    if name.contains("отпуск") {
      SheetKind::Leave
    } else if name.contains("госпитал") {
      SheetKind::Hospitalized
    } else if name.contains("отправ") || name.contains("пвд") {
      SheetKind::Dispatch
    } else {
      SheetKind::Main
    }
  }

  /// The movement every row on this sheet implies, if any.
  pub fn implied_movement(self) -> Option<MovementKind> {
    match self {
      SheetKind::Main => None,
      SheetKind::Leave => Some(MovementKind::Leave),
      SheetKind::Hospitalized => Some(MovementKind::Hospitalized),
      SheetKind::Dispatch => Some(MovementKind::Pvd),
    }
  }

  /// Note recorded on a sheet-implied movement when the row carries none.
  pub fn default_note(self, sheet_name: &str) -> Option<String> {
    let label = match self {
      SheetKind::Main => return None,
      SheetKind::Leave => "Отпуск",
      SheetKind::Hospitalized => "Госпитализация",
      SheetKind::Dispatch => "ПВД",
    };
    Some(format!("{label} ({sheet_name})"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn classifies_by_name_fragment() {
    assert_eq!(SheetKind::classify("Отпуска май"), SheetKind::Leave);
    assert_eq!(SheetKind::classify("ГОСПИТАЛЬ"), SheetKind::Hospitalized);
    assert_eq!(SheetKind::classify("Госпитализированные"), SheetKind::Hospitalized);
    assert_eq!(SheetKind::classify("Отправка"), SheetKind::Dispatch);
    assert_eq!(SheetKind::classify("В ПВД"), SheetKind::Dispatch);
    assert_eq!(SheetKind::classify("Лист1"), SheetKind::Main);
  }

  #[test]
  fn leave_takes_precedence_over_later_fragments() {
    assert_eq!(SheetKind::classify("отпуск и пвд"), SheetKind::Leave);
  }

  #[test]
  fn implied_movements_and_notes() {
    assert_eq!(SheetKind::Dispatch.implied_movement(), Some(MovementKind::Pvd));
    assert_eq!(SheetKind::Main.implied_movement(), None);
    assert_eq!(
      SheetKind::Hospitalized.default_note("Госпиталь").as_deref(),
      Some("Госпитализация (Госпиталь)")
    );
    assert_eq!(SheetKind::Main.default_note("Лист1"), None);
  }
}
