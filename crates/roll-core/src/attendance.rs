//! Attendance records.
//!
//! Records are insert-only in this crate. Corrections (status changes,
//! deletions) belong to the registry, not to check-in.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  context::{ContextId, ContextKind, ContextRef},
  subject::{SubjectId, SubjectRef},
};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AttendanceId(pub i64);

impl fmt::Display for AttendanceId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  AsRefStr,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
  #[default]
  Present,
  Absent,
  Late,
  Excused,
}

/// How an attendance record entered the store.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CheckinMethod {
  Manual,
  Qr,
  Biometric,
}

/// Note attached to every record written by the QR flow.
pub const QR_NOTE: &str = "automatic QR check-in";

/// An attendance record before the store assigns its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttendance {
  pub subject_id:  SubjectId,
  pub context_id:  ContextId,
  /// Set when the context is an event.
  pub event_id:    Option<ContextId>,
  pub status:      AttendanceStatus,
  pub method:      CheckinMethod,
  pub recorded_at: DateTime<Utc>,
  pub notes:       Option<String>,
}

impl NewAttendance {
  /// A `Present` record for `subject` in `context`, taken by `method`.
  pub fn present(
    subject: SubjectRef,
    context: ContextRef,
    method: CheckinMethod,
    recorded_at: DateTime<Utc>,
  ) -> Self {
    let event_id = (context.kind == ContextKind::Event).then_some(context.id);
    let notes = (method == CheckinMethod::Qr).then(|| QR_NOTE.to_owned());
    Self {
      subject_id: subject.id,
      context_id: context.id,
      event_id,
      status: AttendanceStatus::Present,
      method,
      recorded_at,
      notes,
    }
  }
}

/// A persisted attendance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
  pub id:          AttendanceId,
  pub subject_id:  SubjectId,
  pub context_id:  ContextId,
  pub event_id:    Option<ContextId>,
  pub status:      AttendanceStatus,
  pub method:      CheckinMethod,
  pub recorded_at: DateTime<Utc>,
  pub notes:       Option<String>,
}

impl AttendanceRecord {
  pub fn from_new(id: AttendanceId, new: NewAttendance) -> Self {
    Self {
      id,
      subject_id: new.subject_id,
      context_id: new.context_id,
      event_id: new.event_id,
      status: new.status,
      method: new.method,
      recorded_at: new.recorded_at,
      notes: new.notes,
    }
  }
}
