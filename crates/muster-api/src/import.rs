//! Handler for `POST /import`.
//!
//! The body carries the spreadsheet as base64: `{"file": "<base64>"}`. A
//! `data:` URL is accepted as well. Row-level problems come back in the
//! `errors` list of a 200 response; only unreadable input (400) and store
//! failures (500) produce an error status.

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use muster_core::{ImportSummary, import, store::PersonnelStore};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ImportBody {
  pub file: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
  pub success:          bool,
  pub imported:         usize,
  pub skipped:          usize,
  /// `[<sheet>] row <n>: <message>`, in workbook order.
  pub errors:           Vec<String>,
  pub sheets_processed: usize,
}

impl From<ImportSummary> for ImportResponse {
  fn from(summary: ImportSummary) -> Self {
    ImportResponse {
      success:          true,
      imported:         summary.imported,
      skipped:          summary.skipped,
      errors:           summary.errors.iter().map(ToString::to_string).collect(),
      sheets_processed: summary.sheets_processed,
    }
  }
}

/// Decode the base64 payload, tolerating a `data:<mime>;base64,` prefix and
/// embedded whitespace.
fn decode_file(encoded: &str) -> Result<Vec<u8>, ApiError> {
  let payload = match encoded.split_once(";base64,") {
    Some((prefix, rest)) if prefix.starts_with("data:") => rest,
    _ => encoded,
  };
  let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
  B64
    .decode(compact)
    .map_err(|e| ApiError::BadRequest(format!("file is not valid base64: {e}")))
}

/// `POST /import`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<ImportBody>, JsonRejection>,
) -> Result<Json<ImportResponse>, ApiError>
where
  S: PersonnelStore,
{
  let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let encoded = body
    .file
    .filter(|f| !f.trim().is_empty())
    .ok_or_else(|| ApiError::BadRequest("no file provided".into()))?;

  let bytes = decode_file(&encoded)?;
  let workbook =
    muster_xlsx::read(&bytes).map_err(|e| ApiError::BadRequest(e.to_string()))?;
  import::validate(&workbook).map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let today = chrono::Local::now().date_naive();
  let summary = store
    .import_workbook(workbook, today)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  tracing::info!(
    imported = summary.imported,
    skipped = summary.skipped,
    errors = summary.errors.len(),
    sheets = summary.sheets_processed,
    "workbook imported",
  );
  Ok(Json(summary.into()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_plain_and_data_url_payloads() {
    let encoded = B64.encode(b"PK\x03\x04");
    assert_eq!(decode_file(&encoded).unwrap(), b"PK\x03\x04");

    let url = format!(
      "data:application/vnd.openxmlformats-officedocument.spreadsheetml.sheet;base64,{encoded}"
    );
    assert_eq!(decode_file(&url).unwrap(), b"PK\x03\x04");
  }

  #[test]
  fn rejects_garbage() {
    assert!(matches!(decode_file("not base64!"), Err(ApiError::BadRequest(_))));
  }
}
