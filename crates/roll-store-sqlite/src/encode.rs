//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are RFC 3339 strings with millisecond precision. Enums are
//! stored as their lowercase names. Booleans are `0`/`1` integers.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use roll_core::{
  attendance::{AttendanceId, AttendanceRecord, AttendanceStatus, CheckinMethod},
  context::{Context, ContextId, ContextKind, ContextRef},
  subject::{Subject, SubjectId, SubjectKind, SubjectRef},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  T::from_str(s).map_err(|_| Error::InvalidColumn { column, value: s.to_owned() })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `subjects` row.
pub struct RawSubject {
  pub subject_id:   i64,
  pub code:         String,
  pub kind:         String,
  pub display_name: String,
  pub active:       bool,
}

impl RawSubject {
  pub const COLUMNS: &'static str = "subject_id, code, kind, display_name, active";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:   row.get(0)?,
      code:         row.get(1)?,
      kind:         row.get(2)?,
      display_name: row.get(3)?,
      active:       row.get(4)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      id:           SubjectId(self.subject_id),
      code:         self.code,
      kind:         decode_enum("subjects.kind", &self.kind)?,
      display_name: self.display_name,
      active:       self.active,
    })
  }
}

/// Raw values read from a `contexts` row.
pub struct RawContext {
  pub context_id: i64,
  pub code:       String,
  pub kind:       String,
  pub name:       String,
  pub active:     bool,
}

impl RawContext {
  pub const COLUMNS: &'static str = "context_id, code, kind, name, active";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      context_id: row.get(0)?,
      code:       row.get(1)?,
      kind:       row.get(2)?,
      name:       row.get(3)?,
      active:     row.get(4)?,
    })
  }

  pub fn into_context(self) -> Result<Context> {
    Ok(Context {
      id:     ContextId(self.context_id),
      code:   self.code,
      kind:   decode_enum("contexts.kind", &self.kind)?,
      name:   self.name,
      active: self.active,
    })
  }
}

pub fn subject_ref(id: i64, kind: &str) -> Result<SubjectRef> {
  let kind: SubjectKind = decode_enum("subjects.kind", kind)?;
  Ok(SubjectRef { id: SubjectId(id), kind })
}

pub fn context_ref(id: i64, kind: &str) -> Result<ContextRef> {
  let kind: ContextKind = decode_enum("contexts.kind", kind)?;
  Ok(ContextRef { id: ContextId(id), kind })
}

/// Raw values read from an `attendance` row.
pub struct RawAttendance {
  pub attendance_id: i64,
  pub subject_id:    i64,
  pub context_id:    i64,
  pub event_id:      Option<i64>,
  pub status:        String,
  pub method:        String,
  pub recorded_at:   String,
  pub notes:         Option<String>,
}

impl RawAttendance {
  pub const COLUMNS: &'static str =
    "attendance_id, subject_id, context_id, event_id, status, method, recorded_at, notes";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      attendance_id: row.get(0)?,
      subject_id:    row.get(1)?,
      context_id:    row.get(2)?,
      event_id:      row.get(3)?,
      status:        row.get(4)?,
      method:        row.get(5)?,
      recorded_at:   row.get(6)?,
      notes:         row.get(7)?,
    })
  }

  pub fn into_record(self) -> Result<AttendanceRecord> {
    let status: AttendanceStatus = decode_enum("attendance.status", &self.status)?;
    let method: CheckinMethod = decode_enum("attendance.method", &self.method)?;
    Ok(AttendanceRecord {
      id: AttendanceId(self.attendance_id),
      subject_id: SubjectId(self.subject_id),
      context_id: ContextId(self.context_id),
      event_id: self.event_id.map(ContextId),
      status,
      method,
      recorded_at: decode_dt(&self.recorded_at)?,
      notes: self.notes,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn datetime_keeps_milliseconds() {
    let dt = DateTime::from_timestamp_millis(1_763_933_574_081).unwrap();
    let s = encode_dt(dt);
    assert_eq!(s, "2025-11-23T21:32:54.081Z");
    assert_eq!(decode_dt(&s).unwrap(), dt);
  }

  #[test]
  fn unknown_enum_text_is_reported_with_column() {
    let err = decode_enum::<CheckinMethod>("attendance.method", "fax").unwrap_err();
    assert!(matches!(err, Error::InvalidColumn { column: "attendance.method", .. }));
  }
}
