//! Router tests against an in-memory SQLite store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use muster_store_sqlite::SqliteStore;
use rust_xlsxwriter::Workbook as XlsxWorkbook;
use serde_json::{Value, json};
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

async fn make_store() -> Arc<SqliteStore> { Arc::new(SqliteStore::open_in_memory().await.unwrap()) }

async fn send(
  store:  &Arc<SqliteStore>,
  method: &str,
  uri:    &str,
  body:   Option<String>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if body.is_some() {
    builder = builder.header(header::CONTENT_TYPE, "application/json");
  }
  let req = builder.body(body.map(Body::from).unwrap_or_else(Body::empty)).unwrap();
  let resp = api_router(store.clone()).oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

async fn send_json(store: &Arc<SqliteStore>, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
  send(store, method, uri, Some(body.to_string())).await
}

async fn create_person(store: &Arc<SqliteStore>, body: Value) -> Uuid {
  let (status, person) = send_json(store, "POST", "/personnel", body).await;
  assert_eq!(status, StatusCode::CREATED, "{person}");
  person["id"].as_str().unwrap().parse().unwrap()
}

/// A two-sheet roster: the main list and a leave sheet.
fn roster_xlsx() -> Vec<u8> {
  let mut book = XlsxWorkbook::new();

  let main = book.add_worksheet();
  main.set_name("Личный состав").unwrap();
  for (col, title) in ["ФИО", "Личный номер", "Звание", "Подразделение", "Статус"].iter().enumerate() {
    main.write_string(0, col as u16, *title).unwrap();
  }
  main.write_string(1, 0, "Иванов Иван Иванович").unwrap();
  main.write_string(1, 1, "А-100").unwrap();
  main.write_string(1, 2, "сержант").unwrap();
  main.write_string(1, 3, "1 рота").unwrap();
  main.write_string(1, 4, "в строю").unwrap();
  main.write_string(2, 0, "Петров Пётр").unwrap();
  main.write_string(2, 1, "А-200").unwrap();
  main.write_string(2, 2, "генералиссимус").unwrap();
  main.write_string(2, 4, "госпиталь").unwrap();
  main.write_string(3, 1, "А-300").unwrap();

  let leave = book.add_worksheet();
  leave.set_name("Отпуска").unwrap();
  leave.write_string(0, 0, "ФИО").unwrap();
  leave.write_string(0, 1, "Личный номер").unwrap();
  leave.write_string(1, 0, "Иванов Иван Иванович").unwrap();
  leave.write_string(1, 1, "А-100").unwrap();

  book.save_to_buffer().unwrap()
}

fn header_only_xlsx() -> Vec<u8> {
  let mut book = XlsxWorkbook::new();
  let sheet = book.add_worksheet();
  sheet.write_string(0, 0, "ФИО").unwrap();
  book.save_to_buffer().unwrap()
}

// ── Personnel ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_then_get_returns_person_with_empty_timeline() {
  let store = make_store().await;
  let id = create_person(&store, json!({"full_name": "Сидоров С.С.", "personal_number": "777"})).await;

  let (status, body) = send(&store, "GET", &format!("/personnel/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["personnel"]["full_name"], "Сидоров С.С.");
  assert_eq!(body["personnel"]["current_status"], "active");
  assert_eq!(body["movements"], json!([]));
  assert_eq!(body["medical_visits"], json!([]));
}

#[tokio::test]
async fn duplicate_personal_number_is_409() {
  let store = make_store().await;
  create_person(&store, json!({"full_name": "Первый", "personal_number": "42"})).await;

  let (status, body) =
    send_json(&store, "POST", "/personnel", json!({"full_name": "Второй", "personal_number": "42"}))
      .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn blank_full_name_is_400() {
  let store = make_store().await;
  let (status, _) = send_json(&store, "POST", "/personnel", json!({"full_name": "  "})).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_person_is_404() {
  let store = make_store().await;
  let id = Uuid::new_v4();
  let (status, body) = send(&store, "GET", &format!("/personnel/{id}"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains(&id.to_string()));

  let (status, _) = send_json(&store, "PUT", &format!("/personnel/{id}"), json!({"unit": "2"})).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn put_clears_null_fields_and_keeps_absent_ones() {
  let store = make_store().await;
  let id = create_person(
    &store,
    json!({"full_name": "Орлов", "unit": "1 рота", "phone": "+7 900", "rank": "sergeant"}),
  )
  .await;

  let (status, person) = send_json(
    &store,
    "PUT",
    &format!("/personnel/{id}"),
    json!({"unit": null, "rank": "major", "current_status": "leave"}),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(person["unit"], Value::Null);
  assert_eq!(person["rank"], "major");
  assert_eq!(person["current_status"], "leave");
  assert_eq!(person["phone"], "+7 900");
}

#[tokio::test]
async fn list_filters_and_reports_units() {
  let store = make_store().await;
  create_person(&store, json!({"full_name": "Алексеев", "unit": "1 рота"})).await;
  create_person(&store, json!({"full_name": "Борисов", "unit": "2 рота", "current_status": "pvd"}))
    .await;

  let (status, body) = send(&store, "GET", "/personnel", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["personnel"].as_array().unwrap().len(), 2);
  assert_eq!(body["units"], json!(["1 рота", "2 рота"]));

  let (_, body) = send(&store, "GET", "/personnel?status=pvd", None).await;
  let names: Vec<&str> =
    body["personnel"].as_array().unwrap().iter().map(|p| p["full_name"].as_str().unwrap()).collect();
  assert_eq!(names, ["Борисов"]);

  let (_, body) = send(&store, "GET", "/personnel?search=&unit=1%20%D1%80%D0%BE%D1%82%D0%B0", None).await;
  assert_eq!(body["personnel"].as_array().unwrap().len(), 1);
  assert_eq!(body["personnel"][0]["full_name"], "Алексеев");
}

// ── Timeline ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn movement_updates_status_and_shows_in_detail() {
  let store = make_store().await;
  let id = create_person(&store, json!({"full_name": "Волков"})).await;

  let (status, movement) = send_json(
    &store,
    "POST",
    "/movements",
    json!({"person_id": id, "kind": "hospitalized", "start_date": "2024-05-01", "vmo": "ВМО-3"}),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(movement["kind"], "hospitalized");

  let (_, detail) = send(&store, "GET", &format!("/personnel/{id}"), None).await;
  assert_eq!(detail["personnel"]["current_status"], "hospitalized");
  assert_eq!(detail["movements"][0]["vmo"], "ВМО-3");
}

#[tokio::test]
async fn movement_for_unknown_person_is_404() {
  let store = make_store().await;
  let (status, _) = send_json(
    &store,
    "POST",
    "/movements",
    json!({"person_id": Uuid::new_v4(), "kind": "leave", "start_date": "2024-05-01"}),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn medical_visit_sets_fitness_category() {
  let store = make_store().await;
  let id = create_person(&store, json!({"full_name": "Зайцев"})).await;

  let (status, visit) = send_json(
    &store,
    "POST",
    "/medical-visits",
    json!({"person_id": id, "checkup_date": "2024-06-10", "diagnosis": "здоров", "fitness_category": "B"}),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(visit["fitness_category"], "B");

  let (_, detail) = send(&store, "GET", &format!("/personnel/{id}"), None).await;
  assert_eq!(detail["personnel"]["fitness_category"], "B");
  assert_eq!(detail["personnel"]["fitness_category_date"], "2024-06-10");
  assert_eq!(detail["medical_visits"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn stats_count_by_status() {
  let store = make_store().await;
  create_person(&store, json!({"full_name": "А"})).await;
  create_person(&store, json!({"full_name": "Б", "current_status": "leave"})).await;
  create_person(&store, json!({"full_name": "В", "current_status": "discharge"})).await;

  let (status, stats) = send(&store, "GET", "/stats", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stats["total"], 3);
  assert_eq!(stats["active"], 1);
  assert_eq!(stats["leave"], 1);
  assert_eq!(stats["discharged"], 1);
}

// ── Import ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn import_reports_counts_and_row_errors() {
  let store = make_store().await;
  let file = B64.encode(roster_xlsx());

  let (status, body) = send_json(&store, "POST", "/import", json!({"file": file})).await;
  assert_eq!(status, StatusCode::OK, "{body}");
  assert_eq!(body["success"], true);
  assert_eq!(body["sheets_processed"], 2);
  assert_eq!(body["imported"], 3);
  assert_eq!(body["skipped"], 1);
  assert_eq!(body["errors"], json!([]));

  let (_, list) = send(&store, "GET", "/personnel?search=%D0%B8%D0%B2%D0%B0%D0%BD%D0%BE%D0%B2", None)
    .await;
  let ivanov = &list["personnel"][0];
  assert_eq!(ivanov["personal_number"], "А-100");
  assert_eq!(ivanov["rank"], "sergeant");
  assert_eq!(ivanov["current_status"], "active");

  let (_, stats) = send(&store, "GET", "/stats", None).await;
  assert_eq!(stats["total"], 2);
  assert_eq!(stats["hospitalized"], 1);
}

#[tokio::test]
async fn reimport_does_not_duplicate_people() {
  let store = make_store().await;
  let file = B64.encode(roster_xlsx());

  send_json(&store, "POST", "/import", json!({"file": file.clone()})).await;
  let (status, _) = send_json(&store, "POST", "/import", json!({"file": file})).await;
  assert_eq!(status, StatusCode::OK);

  let (_, list) = send(&store, "GET", "/personnel", None).await;
  assert_eq!(list["personnel"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn large_import_bodies_get_the_json_envelope() {
  let store = make_store().await;
  // Well past axum's default 2 MB limit; decodes to zero-filled garbage.
  let file = "A".repeat(3 * 1024 * 1024);

  let (status, body) = send_json(&store, "POST", "/import", json!({"file": file})).await;
  assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn import_rejects_bad_input_with_400() {
  let store = make_store().await;

  let cases = [
    Some("{not json".to_string()),
    Some(json!({}).to_string()),
    Some(json!({"file": ""}).to_string()),
    Some(json!({"file": "%%%"}).to_string()),
    Some(json!({"file": B64.encode(b"plain text, not a workbook")}).to_string()),
    Some(json!({"file": B64.encode(header_only_xlsx())}).to_string()),
  ];
  for body in cases {
    let shown = body.clone().unwrap_or_default();
    let (status, reply) = send(&store, "POST", "/import", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{shown} -> {reply}");
    assert!(reply["error"].is_string());
  }

  let (_, stats) = send(&store, "GET", "/stats", None).await;
  assert_eq!(stats["total"], 0);
}
