//! Handler for `GET /attendance`.
//!
//! Query params map directly to [`AttendanceQuery`] fields.

use axum::{
  Json,
  extract::{Query, State},
};
use roll_core::{
  attendance::{AttendanceRecord, CheckinMethod},
  context::ContextId,
  store::{AttendanceQuery, Registry},
  subject::SubjectId,
};
use serde::Deserialize;

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  pub subject_id: Option<SubjectId>,
  pub context_id: Option<ContextId>,
  /// `manual`, `qr` or `biometric`.
  pub method:     Option<CheckinMethod>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

/// `GET /attendance[?subject_id=...][&context_id=...][&method=...][&limit=...][&offset=...]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<AttendanceRecord>>, ApiError>
where
  S: Registry,
{
  let query = AttendanceQuery {
    subject_id: params.subject_id,
    context_id: params.context_id,
    method:     params.method,
    limit:      params.limit,
    offset:     params.offset,
  };
  let records = state
    .store
    .list_attendance(&query)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}
