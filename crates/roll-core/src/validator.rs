//! Check-in validator.
//!
//! A stateless pipeline run once per scan:
//!
//! 1. expiry of the embedded issuance timestamp,
//! 2. subject code → [`SubjectRef`],
//! 3. context code → [`ContextRef`],
//! 4. context still active,
//! 5. no attendance already recorded for the pair,
//! 6. hand over to the [`recorder`](crate::recorder).
//!
//! Each failed step ends the pipeline with a [`CheckinResult`]. Nothing is
//! written before step 6.

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  attendance::CheckinMethod,
  context::ContextRef,
  outcome::CheckinResult,
  payload::AttendancePayload,
  recorder,
  store::{AttendanceStore, ContextDirectory, SubjectDirectory},
  subject::{SubjectKind, SubjectRef},
};

/// Payloads older than this are refused: ten minutes.
pub const DEFAULT_EXPIRY_WINDOW_MILLIS: i64 = 10 * 60 * 1000;

/// `Some(Expired)` if more than `window_millis` passed since issuance.
/// Exactly `window_millis` is still valid.
pub fn check_expiry(
  issued_at_millis: i64,
  now_millis: i64,
  window_millis: i64,
) -> Option<CheckinResult> {
  let elapsed = now_millis.saturating_sub(issued_at_millis);
  (elapsed > window_millis).then_some(CheckinResult::Expired {
    elapsed_seconds: elapsed / 1000,
  })
}

/// Validate and, if everything checks out, record an attendance payload
/// using the default ten-minute window.
pub async fn validate<S>(
  store: &S,
  payload: &AttendancePayload,
  now_millis: i64,
) -> Result<CheckinResult>
where
  S: SubjectDirectory + ContextDirectory + AttendanceStore,
{
  validate_within(store, payload, now_millis, DEFAULT_EXPIRY_WINDOW_MILLIS).await
}

pub async fn validate_within<S>(
  store: &S,
  payload: &AttendancePayload,
  now_millis: i64,
  window_millis: i64,
) -> Result<CheckinResult>
where
  S: SubjectDirectory + ContextDirectory + AttendanceStore,
{
  if let Some(expired) = check_expiry(payload.issued_at_millis, now_millis, window_millis) {
    return Ok(expired);
  }

  let admission =
    admit(store, &payload.subject_code, &payload.context_code, None).await?;
  settle(store, admission, now_millis).await
}

// ─── Shared pipeline ─────────────────────────────────────────────────────────

/// What the holder of a badge claims to be; checked against the directory.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Claim<'a> {
  pub kind: SubjectKind,
  pub id:   &'a str,
}

pub(crate) enum Admission {
  Admit { subject: SubjectRef, context: ContextRef },
  Reject(CheckinResult),
}

/// Steps 2–5.
pub(crate) async fn admit<S>(
  store: &S,
  subject_code: &str,
  context_code: &str,
  claim: Option<Claim<'_>>,
) -> Result<Admission>
where
  S: SubjectDirectory + ContextDirectory + AttendanceStore,
{
  let Some(subject) = store
    .find_subject_by_code(subject_code)
    .await
    .map_err(Error::persistence)?
  else {
    return Ok(Admission::Reject(CheckinResult::UnknownSubject));
  };

  if let Some(claim) = claim
    && (claim.kind != subject.kind || claim.id != subject.id.to_string())
  {
    tracing::debug!(subject_code, claimed_id = claim.id, "badge does not match directory");
    return Ok(Admission::Reject(CheckinResult::UnknownSubject));
  }

  let Some(context) = store
    .find_context_by_code(context_code)
    .await
    .map_err(Error::persistence)?
  else {
    return Ok(Admission::Reject(CheckinResult::UnknownContext));
  };

  if !store
    .is_context_active(context.id)
    .await
    .map_err(Error::persistence)?
  {
    return Ok(Admission::Reject(CheckinResult::UnknownContext));
  }

  if store
    .exists(subject.id, context.id)
    .await
    .map_err(Error::persistence)?
  {
    return Ok(Admission::Reject(CheckinResult::AlreadyRecorded));
  }

  Ok(Admission::Admit { subject, context })
}

/// Step 6.
pub(crate) async fn settle<S>(
  store: &S,
  admission: Admission,
  now_millis: i64,
) -> Result<CheckinResult>
where
  S: AttendanceStore,
{
  match admission {
    Admission::Reject(result) => Ok(result),
    Admission::Admit { subject, context } => {
      let at = timestamp(now_millis)?;
      let attendance_id =
        recorder::record(store, subject, context, CheckinMethod::Qr, at).await?;
      Ok(CheckinResult::Accepted { attendance_id })
    }
  }
}

fn timestamp(millis: i64) -> Result<DateTime<Utc>> {
  DateTime::from_timestamp_millis(millis).ok_or(Error::TimestampOutOfRange(millis))
}
