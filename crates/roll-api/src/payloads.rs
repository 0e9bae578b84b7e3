//! Handlers for `/payloads` endpoints: payload text for QR generators.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/payloads/attendance` | Body: `{"subject_code":"…","context_code":"…"}` |
//! | `POST` | `/payloads/badge` | Body: `{"subject_code":"…","extra":"…"}` |
//!
//! Both refuse codes that are not registered.

use axum::{Json, extract::State};
use roll_core::{payload, store::Registry};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct PayloadResponse {
  pub payload: String,
}

// ─── Attendance ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AttendanceBody {
  pub subject_code: String,
  pub context_code: String,
}

/// `POST /payloads/attendance`
pub async fn attendance<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<AttendanceBody>,
) -> Result<Json<PayloadResponse>, ApiError>
where
  S: Registry,
{
  let store = state.store.as_ref();
  store
    .get_subject(&body.subject_code)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {} not found", body.subject_code)))?;
  store
    .get_context(&body.context_code)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("context {} not found", body.context_code)))?;

  let payload =
    payload::issue_attendance(&body.subject_code, &body.context_code, state.now_millis())?;
  Ok(Json(PayloadResponse { payload }))
}

// ─── Badge ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BadgeBody {
  pub subject_code: String,
  /// Free-form detail line printed on the badge.
  #[serde(default)]
  pub extra:        String,
}

/// `POST /payloads/badge`
pub async fn badge<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<BadgeBody>,
) -> Result<Json<PayloadResponse>, ApiError>
where
  S: Registry,
{
  let holder = state
    .store
    .get_subject(&body.subject_code)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {} not found", body.subject_code)))?;

  let payload = payload::issue_badge(&holder, &body.extra, state.now_millis())?;
  Ok(Json(PayloadResponse { payload }))
}
