//! Handler for `POST /checkin`.
//!
//! Every business outcome is a `200` carrying the [`CheckinResult`]; only a
//! store failure is an error status. The scan time is always the server's
//! clock, so a client cannot stretch the expiry window.

use axum::{Json, extract::State};
use roll_core::{
  CheckIn, CheckinResult,
  store::{AttendanceStore, ContextDirectory, SubjectDirectory},
};
use serde::{Deserialize, Serialize};

use crate::{ApiState, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct CheckinBody {
  /// Text decoded from the QR image.
  pub raw: String,
}

#[derive(Debug, Serialize)]
pub struct CheckinResponse {
  #[serde(flatten)]
  pub result:  CheckinResult,
  pub message: String,
}

/// `POST /checkin`, body: `{"raw":"UPeU-ASIST-..."}`
pub async fn handler<S>(
  State(state): State<ApiState<S>>,
  Json(body): Json<CheckinBody>,
) -> Result<Json<CheckinResponse>, ApiError>
where
  S: SubjectDirectory + ContextDirectory + AttendanceStore,
{
  let now = state.now_millis();
  let result = CheckIn::with_policy(state.store.as_ref(), (*state.policy).clone())
    .check_in(&body.raw, now)
    .await?;
  Ok(Json(CheckinResponse { result, message: result.message() }))
}
