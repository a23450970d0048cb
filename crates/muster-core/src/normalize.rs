//! Value normalizers: free-text spreadsheet cells → canonical typed values.
//!
//! All functions are total. A value that cannot be understood is reported
//! as `None` (or the default status), never as an error.
//!
//! Every canonicalizer also accepts the canonical slug of its own output, so
//! `parse_rank(r.as_str()) == Some(r)` for every rank, and likewise for
//! statuses and fitness categories.

use std::{collections::HashMap, sync::LazyLock};

use chrono::NaiveDate;

use crate::{
  person::{FitnessCategory, Rank, Status},
  workbook::Cell,
};

/// Accepted textual date layouts, tried in order.
const DATE_FORMATS: [&str; 3] = ["%d.%m.%Y", "%Y-%m-%d", "%d/%m/%Y"];

static RANKS: LazyLock<HashMap<&'static str, Rank>> = LazyLock::new(|| {
  HashMap::from([
    ("рядовой", Rank::Private),
    ("рядовий", Rank::Private),
    ("ефрейтор", Rank::Corporal),
    ("младший сержант", Rank::JuniorSergeant),
    ("мл сержант", Rank::JuniorSergeant),
    ("сержант", Rank::Sergeant),
    ("старший сержант", Rank::SeniorSergeant),
    ("ст сержант", Rank::SeniorSergeant),
    ("старшина", Rank::Foreman),
    ("прапорщик", Rank::WarrantOfficer),
    ("старший прапорщик", Rank::SeniorWarrantOfficer),
    ("ст прапорщик", Rank::SeniorWarrantOfficer),
    ("младший лейтенант", Rank::JuniorLieutenant),
    ("мл лейтенант", Rank::JuniorLieutenant),
    ("лейтенант", Rank::Lieutenant),
    ("старший лейтенант", Rank::SeniorLieutenant),
    ("ст лейтенант", Rank::SeniorLieutenant),
    ("капитан", Rank::Captain),
    ("майор", Rank::Major),
    ("подполковник", Rank::LieutenantColonel),
    ("полковник", Rank::Colonel),
  ])
});

static STATUSES: LazyLock<HashMap<&'static str, Status>> = LazyLock::new(|| {
  HashMap::from([
    ("находится", Status::Active),
    ("в части", Status::Active),
    ("активный", Status::Active),
    ("в строю", Status::Active),
    ("отпуск", Status::Leave),
    ("отпуска", Status::Leave),
    ("командировка", Status::BusinessTrip),
    ("в командировке", Status::BusinessTrip),
    ("госпитализация", Status::Hospitalized),
    ("госпиталь", Status::Hospitalized),
    ("в госпитале", Status::Hospitalized),
    ("вкк", Status::Vkk),
    ("ввк", Status::Vvk),
    ("цввк", Status::Cvvk),
    ("пвд", Status::Pvd),
    ("в пвд", Status::Pvd),
    ("ввк на изменение категории", Status::VvkCategoryChange),
    ("амбулаторное лечение", Status::AmbulatoryTreatment),
    ("амбулаторное", Status::AmbulatoryTreatment),
    ("увольнение", Status::Discharge),
    ("уволен", Status::Discharge),
    ("убыл", Status::Discharge),
  ])
});

/// Cyrillic and Latin spellings per category; digits 1–4 are sub-grades.
static FITNESS: LazyLock<HashMap<&'static str, FitnessCategory>> = LazyLock::new(|| {
  use FitnessCategory::*;
  HashMap::from([
    ("А", A),
    ("A", A),
    ("А1", A),
    ("А2", A),
    ("А3", A),
    ("А4", A),
    ("Б", B),
    ("B", B),
    ("Б1", B),
    ("Б2", B),
    ("Б3", B),
    ("Б4", B),
    ("В", V),
    ("V", V),
    ("В1", V),
    ("В2", V),
    ("В3", V),
    ("В4", V),
    ("Г", G),
    ("G", G),
    ("Д", D),
    ("D", D),
  ])
});

/// Parse a date cell.
///
/// Native date cells pass through; text is tried against `DD.MM.YYYY`,
/// `YYYY-MM-DD` and `DD/MM/YYYY` in that order. Anything else is `None`.
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
  match cell {
    Cell::DateTime(dt) => Some(dt.date()),
    Cell::Text(s) => parse_date_str(s),
    _ => None,
  }
}

/// Text-only half of [`parse_date`].
pub fn parse_date_str(s: &str) -> Option<NaiveDate> {
  let s = s.trim();
  if s.is_empty() {
    return None;
  }
  DATE_FORMATS
    .iter()
    .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Exact, case-insensitive rank lookup. No fuzzy matching.
pub fn parse_rank(s: &str) -> Option<Rank> {
  let key = s.trim().to_lowercase();
  if key.is_empty() {
    return None;
  }
  RANKS.get(key.as_str()).copied().or_else(|| key.parse().ok())
}

/// Exact, case-insensitive status lookup.
///
/// Empty input and unrecognised input both yield [`Status::Active`].
pub fn parse_status(s: &str) -> Status {
  let key = s.trim().to_lowercase();
  if key.is_empty() {
    return Status::Active;
  }
  match STATUSES.get(key.as_str()).copied().or_else(|| key.parse().ok()) {
    Some(status) => status,
    None => {
      tracing::debug!(value = %key, "unrecognised status, treating as active");
      Status::Active
    }
  }
}

/// Map a category letter (optionally followed by a sub-grade digit) to its
/// [`FitnessCategory`].
pub fn parse_fitness_category(s: &str) -> Option<FitnessCategory> {
  let key = s.trim().to_uppercase();
  if key.is_empty() {
    return None;
  }
  FITNESS.get(key.as_str()).copied()
}

/// Parse a whole, positive number of days (e.g. a leave duration).
///
/// Accepts numeric cells and text such as `"30"` or `"30 суток"`.
pub fn parse_day_count(cell: &Cell) -> Option<u32> {
  let days = match cell {
    Cell::Number(n) if n.fract() == 0.0 && *n >= 1.0 && *n <= f64::from(u32::MAX) => *n as u32,
    Cell::Text(s) => {
      let s = s.trim();
      let digits = s.split_whitespace().next()?;
      let rest = s[digits.len()..].trim().to_lowercase();
      if !rest.is_empty() && !["сут", "дн", "день", "дня", "дней"].iter().any(|u| rest.starts_with(u)) {
        return None;
      }
      digits.parse().ok()?
    }
    _ => return None,
  };
  (days > 0).then_some(days)
}
