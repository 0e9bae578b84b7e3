//! Handlers for `/contexts` endpoints (courses and events).
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/contexts` | Body: `{"code":"IG234","kind":"event","name":"…"}` |
//! | `GET`  | `/contexts/:code` | 404 if not found |
//! | `PUT`  | `/contexts/:code/active` | Body: `{"active":false}` |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use roll_core::{
  context::{Context, NewContext},
  store::Registry,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct ActiveBody {
  pub active: bool,
}

/// `POST /contexts`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<NewContext>,
) -> Result<impl IntoResponse, ApiError>
where
  S: Registry,
{
  if body.code.is_empty() {
    return Err(ApiError::BadRequest("context code must not be empty".into()));
  }
  let context = state.store.add_context(body).await.map_err(ApiError::store)?;
  tracing::info!(code = %context.code, id = %context.id, "context registered");
  Ok((StatusCode::CREATED, Json(context)))
}

/// `GET /contexts/:code`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(code): Path<String>,
) -> Result<Json<Context>, ApiError>
where
  S: Registry,
{
  let context = state
    .store
    .get_context(&code)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("context {code} not found")))?;
  Ok(Json(context))
}

/// `PUT /contexts/:code/active`. Closing a session stops further check-ins.
pub async fn set_active<S>(
  State(state): State<ApiState<S>>,
  Path(code): Path<String>,
  Json(body): Json<ActiveBody>,
) -> Result<Json<Context>, ApiError>
where
  S: Registry,
{
  let context = state
    .store
    .set_context_active(&code, body.active)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("context {code} not found")))?;
  tracing::info!(%code, active = context.active, "context activity changed");
  Ok(Json(context))
}
