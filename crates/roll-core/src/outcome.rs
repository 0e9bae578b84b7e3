//! The typed outcome of a check-in attempt.

use serde::{Deserialize, Serialize};

use crate::attendance::AttendanceId;

/// Every way a scan can end short of an infrastructure failure.
///
/// The presentation layer turns this into an operator message; see
/// [`CheckinResult::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CheckinResult {
  Accepted { attendance_id: AttendanceId },
  Expired { elapsed_seconds: i64 },
  UnknownSubject,
  UnknownContext,
  AlreadyRecorded,
  MalformedPayload,
}

impl CheckinResult {
  pub fn is_accepted(&self) -> bool { matches!(self, Self::Accepted { .. }) }

  /// Short operator-facing description.
  pub fn message(&self) -> String {
    match self {
      Self::Accepted { attendance_id } => {
        format!("attendance recorded (#{attendance_id})")
      }
      Self::Expired { elapsed_seconds } => format!(
        "QR code expired: issued {} min ago, generate a new one",
        elapsed_seconds / 60
      ),
      Self::UnknownSubject => "no active student or teacher with this code".into(),
      Self::UnknownContext => "the course or event does not exist or is not active".into(),
      Self::AlreadyRecorded => "attendance is already recorded for this session".into(),
      Self::MalformedPayload => "not a valid attendance QR code".into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn serialises_with_outcome_tag() {
    let json = serde_json::to_value(CheckinResult::Accepted { attendance_id: AttendanceId(9) })
      .unwrap();
    assert_eq!(json, serde_json::json!({ "outcome": "accepted", "attendance_id": 9 }));

    let json = serde_json::to_value(CheckinResult::AlreadyRecorded).unwrap();
    assert_eq!(json, serde_json::json!({ "outcome": "already_recorded" }));
  }

  #[test]
  fn expired_message_reports_minutes() {
    let msg = CheckinResult::Expired { elapsed_seconds: 725 }.message();
    assert!(msg.contains("12 min"), "{msg}");
  }
}
