//! Handlers for `/subjects` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/subjects` | Body: `{"code":"…","kind":"student","display_name":"…"}` |
//! | `GET`  | `/subjects/:code` | 404 if not found |
//! | `PUT`  | `/subjects/:code/active` | Body: `{"active":false}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use roll_core::{
  store::Registry,
  subject::{NewSubject, Subject},
};

use crate::{ApiState, contexts::ActiveBody, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /subjects`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewSubject>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Registry,
{
  if body.code.is_empty() {
    return Err(ApiError::BadRequest("subject code must not be empty".into()));
  }
  let subject = state.store.add_subject(body).await.map_err(ApiError::store)?;
  tracing::info!(code = %subject.code, id = %subject.id, "subject registered");
  Ok((StatusCode::CREATED, Json(subject)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /subjects/:code`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(code): Path<String>,
) -> Result<Json<Subject>, ApiError>
where
  S: Registry,
{
  let subject = state
    .store
    .get_subject(&code)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {code} not found")))?;
  Ok(Json(subject))
}

// ─── Activity ─────────────────────────────────────────────────────────────────

/// `PUT /subjects/:code/active`
pub async fn set_active<S>(
  State(state): State<ApiState<S>>,
  Path(code): Path<String>,
  Json(body): Json<ActiveBody>,
) -> Result<Json<Subject>, ApiError>
where
  S: Registry,
{
  let subject = state
    .store
    .set_subject_active(&code, body.active)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("subject {code} not found")))?;
  Ok(Json(subject))
}
