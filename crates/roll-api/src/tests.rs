use std::sync::Arc;

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use roll_core::{
  CheckinPolicy,
  context::{ContextId, NewContext},
  subject::{NewSubject, SubjectId},
};
use roll_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use super::{ApiError, api_router_with_clock};

const NOW: i64 = 1_763_933_574_081;

async fn make_store() -> SqliteStore {
  let store = SqliteStore::open_in_memory().await.unwrap();
  store
    .add_subject_with_id(SubjectId(42), NewSubject::student("202434565", "Ana Quispe"))
    .await
    .unwrap();
  store
    .add_context_with_id(ContextId(1), NewContext::event("IG234", "Semana de Ingeniería"))
    .await
    .unwrap();
  store
}

fn router_at(store: SqliteStore, policy: CheckinPolicy) -> Router {
  api_router_with_clock(Arc::new(store), policy, Arc::new(|| NOW))
}

async fn make_router() -> Router {
  router_at(make_store().await, CheckinPolicy::default())
}

async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = router.oneshot(builder.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, json)
}

// ── Check-in ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn checkin_accepts_fresh_payload() {
  let router = make_router().await;
  let raw = format!("UPeU-ASIST-202434565-IG234-{}", NOW - 5_000);

  let (status, body) = send(router.clone(), "POST", "/checkin", Some(json!({ "raw": raw }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["outcome"], "accepted");
  assert!(body["message"].as_str().unwrap().contains("recorded"));

  let (_, rows) = send(router, "GET", "/attendance?subject_id=42&context_id=1", None).await;
  let rows = rows.as_array().unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0]["method"], "qr");
  assert_eq!(rows[0]["status"], "present");
}

#[tokio::test]
async fn checkin_twice_reports_already_recorded() {
  let router = make_router().await;
  let raw = format!("UPeU-ASIST-202434565-IG234-{NOW}");
  let req = json!({ "raw": raw });

  send(router.clone(), "POST", "/checkin", Some(req.clone())).await;
  let (status, body) = send(router, "POST", "/checkin", Some(req)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["outcome"], "already_recorded");
}

#[tokio::test]
async fn checkin_business_failures_are_ok_responses() {
  let router = make_router().await;

  let (status, body) =
    send(router.clone(), "POST", "/checkin", Some(json!({ "raw": "garbage" }))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["outcome"], "malformed_payload");

  let stale = format!("UPeU-ASIST-202434565-IG234-{}", NOW - 600_001);
  let (_, body) = send(router.clone(), "POST", "/checkin", Some(json!({ "raw": stale }))).await;
  assert_eq!(body["outcome"], "expired");
  assert_eq!(body["elapsed_seconds"], 600);

  let stranger = format!("UPeU-ASIST-999-IG234-{NOW}");
  let (_, body) = send(router, "POST", "/checkin", Some(json!({ "raw": stranger }))).await;
  assert_eq!(body["outcome"], "unknown_subject");
}

#[tokio::test]
async fn client_supplied_clock_is_ignored() {
  let router = make_router().await;
  let issued = NOW - 86_400_000;
  let raw = format!("UPeU-ASIST-202434565-IG234-{issued}");

  let (status, body) = send(
    router.clone(),
    "POST",
    "/checkin",
    Some(json!({ "raw": raw, "now_millis": issued })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["outcome"], "expired");
  assert_eq!(body["elapsed_seconds"], 86_400);

  let (_, rows) = send(router, "GET", "/attendance", None).await;
  assert!(rows.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn recorded_at_is_server_time() {
  let router = make_router().await;
  let raw = format!("UPeU-ASIST-202434565-IG234-{}", NOW - 1_000);
  send(router.clone(), "POST", "/checkin", Some(json!({ "raw": raw }))).await;

  let (_, rows) = send(router, "GET", "/attendance", None).await;
  assert_eq!(rows[0]["recorded_at"], "2025-11-23T21:32:54.081Z");
}

#[tokio::test]
async fn badge_checkin_uses_station_context() {
  let policy = CheckinPolicy { station_context: Some("IG234".into()), ..Default::default() };
  let router = router_at(make_store().await, policy);

  let raw = format!("EST|42|202434565|Ana Quispe|Sistemas|{NOW}");
  let (_, body) = send(router, "POST", "/checkin", Some(json!({ "raw": raw }))).await;
  assert_eq!(body["outcome"], "accepted");
}

// ── Payloads ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn issued_attendance_payload_checks_in() {
  let router = make_router().await;

  let (status, body) = send(
    router.clone(),
    "POST",
    "/payloads/attendance",
    Some(json!({ "subject_code": "202434565", "context_code": "IG234" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let payload = body["payload"].as_str().unwrap().to_owned();
  assert!(payload.starts_with("UPeU-ASIST-202434565-IG234-"), "{payload}");

  let (_, body) = send(router, "POST", "/checkin", Some(json!({ "raw": payload }))).await;
  assert_eq!(body["outcome"], "accepted");
}

#[tokio::test]
async fn payload_for_unregistered_codes_is_404() {
  let router = make_router().await;

  let (status, _) = send(
    router.clone(),
    "POST",
    "/payloads/attendance",
    Some(json!({ "subject_code": "202434565", "context_code": "NOPE" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, body) =
    send(router, "POST", "/payloads/badge", Some(json!({ "subject_code": "ghost" }))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn badge_payload_carries_registry_id() {
  let router = make_router().await;
  let (status, body) = send(
    router,
    "POST",
    "/payloads/badge",
    Some(json!({ "subject_code": "202434565", "extra": "Sistemas" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  let payload = body["payload"].as_str().unwrap();
  assert!(payload.starts_with("EST|42|202434565|Ana Quispe|Sistemas|"), "{payload}");
}

// ── Registry ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_subject() {
  let router = make_router().await;

  let (status, created) = send(
    router.clone(),
    "POST",
    "/subjects",
    Some(json!({ "code": "D0042", "kind": "teacher", "display_name": "Luis Mamani" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["active"], true);

  let (status, fetched) = send(router, "GET", "/subjects/D0042", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, created);
}

#[tokio::test]
async fn duplicate_subject_is_conflict() {
  let router = make_router().await;
  let (status, _) = send(
    router,
    "POST",
    "/subjects",
    Some(json!({ "code": "202434565", "kind": "student", "display_name": "Again" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn duplicate_context_is_conflict() {
  let router = make_router().await;
  let (status, body) = send(
    router,
    "POST",
    "/contexts",
    Some(json!({ "code": "IG234", "kind": "course", "name": "Again" })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains("IG234"));
}

#[test]
fn unique_violations_from_the_store_are_conflicts() {
  let err = ApiError::store(roll_store_sqlite::Error::DuplicateSubject("D0042".into()));
  assert!(matches!(err, ApiError::Conflict(_)), "{err:?}");

  let err = ApiError::store(roll_store_sqlite::Error::DateParse("bad".into()));
  assert!(matches!(err, ApiError::Store(_)), "{err:?}");
}

#[tokio::test]
async fn missing_subject_is_404() {
  let (status, _) = send(make_router().await, "GET", "/subjects/nobody", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn closed_context_refuses_checkin() {
  let router = make_router().await;

  let (status, body) = send(
    router.clone(),
    "PUT",
    "/contexts/IG234/active",
    Some(json!({ "active": false })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["active"], false);

  let raw = format!("UPeU-ASIST-202434565-IG234-{NOW}");
  let (_, body) = send(router, "POST", "/checkin", Some(json!({ "raw": raw }))).await;
  assert_eq!(body["outcome"], "unknown_context");
}

#[tokio::test]
async fn create_context_then_fetch() {
  let router = make_router().await;
  let (status, _) = send(
    router.clone(),
    "POST",
    "/contexts",
    Some(json!({ "code": "MA101", "kind": "course", "name": "Cálculo I" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, body) = send(router, "GET", "/contexts/MA101", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["kind"], "course");
}
