//! The check-in entry point exposed to the presentation layer.

use crate::{
  Result,
  outcome::CheckinResult,
  payload::{self, BadgeKind, ProfileBadgePayload, QrPayload},
  store::{AttendanceStore, ContextDirectory, SubjectDirectory},
  subject::SubjectKind,
  validator::{self, Claim, DEFAULT_EXPIRY_WINDOW_MILLIS},
};

/// Station-level settings for a check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckinPolicy {
  pub expiry_window_millis: i64,
  /// Context code applied to profile badges, which carry none themselves.
  /// Without it every badge scan yields [`CheckinResult::UnknownContext`].
  pub station_context:      Option<String>,
}

impl Default for CheckinPolicy {
  fn default() -> Self {
    Self { expiry_window_millis: DEFAULT_EXPIRY_WINDOW_MILLIS, station_context: None }
  }
}

/// Decode → validate → record, in one call.
#[derive(Debug)]
pub struct CheckIn<'a, S> {
  store:  &'a S,
  policy: CheckinPolicy,
}

impl<'a, S> CheckIn<'a, S>
where
  S: SubjectDirectory + ContextDirectory + AttendanceStore,
{
  pub fn new(store: &'a S) -> Self { Self { store, policy: CheckinPolicy::default() } }

  pub fn with_policy(store: &'a S, policy: CheckinPolicy) -> Self { Self { store, policy } }

  pub fn policy(&self) -> &CheckinPolicy { &self.policy }

  /// Check in whatever `raw` decodes to.
  ///
  /// Every business failure is a [`CheckinResult`]; `Err` means a
  /// collaborator failed and the scan can be retried.
  pub async fn check_in(&self, raw: &str, now_millis: i64) -> Result<CheckinResult> {
    let payload = match payload::decode(raw) {
      Ok(p) => p,
      Err(reason) => {
        tracing::debug!(%reason, "malformed payload");
        return Ok(CheckinResult::MalformedPayload);
      }
    };

    let result = match &payload {
      QrPayload::Attendance(p) => {
        validator::validate_within(self.store, p, now_millis, self.policy.expiry_window_millis)
          .await?
      }
      QrPayload::Badge(b) => self.check_in_badge(b, now_millis).await?,
    };

    if !result.is_accepted() {
      tracing::warn!(
        subject_code = payload.subject_code(),
        outcome = ?result,
        "check-in rejected"
      );
    }
    Ok(result)
  }

  /// Check in a profile badge against the station context.
  pub async fn check_in_badge(
    &self,
    badge: &ProfileBadgePayload,
    now_millis: i64,
  ) -> Result<CheckinResult> {
    if let Some(expired) = validator::check_expiry(
      badge.issued_at_millis,
      now_millis,
      self.policy.expiry_window_millis,
    ) {
      return Ok(expired);
    }

    let kind = match badge.kind {
      BadgeKind::Student => SubjectKind::Student,
      BadgeKind::Teacher => SubjectKind::Teacher,
      // Administrators have no attendance of their own.
      BadgeKind::Admin => return Ok(CheckinResult::UnknownSubject),
    };

    let Some(context_code) = self.policy.station_context.as_deref() else {
      return Ok(CheckinResult::UnknownContext);
    };

    let claim = Claim { kind, id: &badge.subject_id };
    let admission =
      validator::admit(self.store, &badge.subject_code, context_code, Some(claim)).await?;
    validator::settle(self.store, admission, now_millis).await
  }
}
