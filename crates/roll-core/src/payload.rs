//! QR payload codec.
//!
//! Two wire formats are recognised:
//!
//! - **Attendance**: `UPeU-ASIST-{subject}-{context}-{issued_at_millis}`,
//!   hyphen-delimited. Issued for one subject and one course or event.
//! - **Profile badge**: `{kind}|{id}|{code}|{name}|{extra}|{issued_at_millis}`,
//!   pipe-delimited, where `kind` is `EST`, `DOC` or `ADM`.
//!
//! Decoding is pure: no I/O and no clock. Expiry is the validator's concern.

use std::str::FromStr as _;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::{
  error::MalformedPayload,
  subject::{Subject, SubjectKind},
};

/// Leading marker of the attendance format, including its trailing delimiter.
pub const ATTENDANCE_PREFIX: &str = "UPeU-ASIST-";

const ATTENDANCE_DELIMITER: char = '-';
const ATTENDANCE_MIN_FIELDS: usize = 5;

const BADGE_DELIMITER: char = '|';
const BADGE_MIN_FIELDS: usize = 6;

// ─── Types ───────────────────────────────────────────────────────────────────

/// A decoded QR payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum QrPayload {
  Attendance(AttendancePayload),
  Badge(ProfileBadgePayload),
}

impl QrPayload {
  pub fn issued_at_millis(&self) -> i64 {
    match self {
      Self::Attendance(p) => p.issued_at_millis,
      Self::Badge(p) => p.issued_at_millis,
    }
  }

  pub fn subject_code(&self) -> &str {
    match self {
      Self::Attendance(p) => &p.subject_code,
      Self::Badge(p) => &p.subject_code,
    }
  }
}

/// A single-use attendance code for one subject in one context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePayload {
  pub subject_code:     String,
  pub context_code:     String,
  pub issued_at_millis: i64,
}

impl AttendancePayload {
  pub fn new(
    subject_code: impl Into<String>,
    context_code: impl Into<String>,
    issued_at_millis: i64,
  ) -> Self {
    Self {
      subject_code: subject_code.into(),
      context_code: context_code.into(),
      issued_at_millis,
    }
  }

  /// Render the payload text. Codes containing `-` would not survive a
  /// decode and are rejected.
  pub fn encode(&self) -> Result<String, MalformedPayload> {
    check_field("subject_code", &self.subject_code, ATTENDANCE_DELIMITER)?;
    check_field("context_code", &self.context_code, ATTENDANCE_DELIMITER)?;
    Ok(format!(
      "{ATTENDANCE_PREFIX}{}{ATTENDANCE_DELIMITER}{}{ATTENDANCE_DELIMITER}{}",
      self.subject_code, self.context_code, self.issued_at_millis
    ))
  }
}

/// Who a profile badge was issued to. The wire tag is the Spanish
/// abbreviation printed by the badge generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
pub enum BadgeKind {
  #[strum(serialize = "EST")]
  Student,
  #[strum(serialize = "DOC")]
  Teacher,
  #[strum(serialize = "ADM")]
  Admin,
}

/// A personal badge identifying its holder; carries no context of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileBadgePayload {
  pub kind:             BadgeKind,
  /// Registry id of the holder, as printed on the badge.
  pub subject_id:       String,
  pub subject_code:     String,
  pub display_name:     String,
  /// Free-form detail line (programme, department, ...).
  pub extra:            String,
  pub issued_at_millis: i64,
}

impl ProfileBadgePayload {
  pub fn encode(&self) -> Result<String, MalformedPayload> {
    check_field("subject_id", &self.subject_id, BADGE_DELIMITER)?;
    check_field("subject_code", &self.subject_code, BADGE_DELIMITER)?;
    check_field("display_name", &self.display_name, BADGE_DELIMITER)?;
    check_field("extra", &self.extra, BADGE_DELIMITER)?;
    let d = BADGE_DELIMITER;
    Ok(format!(
      "{kind}{d}{}{d}{}{d}{}{d}{}{d}{}",
      self.subject_id,
      self.subject_code,
      self.display_name,
      self.extra,
      self.issued_at_millis,
      kind = self.kind.as_ref(),
    ))
  }
}

// ─── Issuing ─────────────────────────────────────────────────────────────────

/// Attendance payload text for one subject in one context, stamped with
/// `now_millis`.
pub fn issue_attendance(
  subject_code: &str,
  context_code: &str,
  now_millis: i64,
) -> Result<String, MalformedPayload> {
  AttendancePayload::new(subject_code, context_code, now_millis).encode()
}

/// Badge payload text for a registered subject.
pub fn issue_badge(
  holder: &Subject,
  extra: &str,
  now_millis: i64,
) -> Result<String, MalformedPayload> {
  let kind = match holder.kind {
    SubjectKind::Student => BadgeKind::Student,
    SubjectKind::Teacher => BadgeKind::Teacher,
  };
  ProfileBadgePayload {
    kind,
    subject_id: holder.id.to_string(),
    subject_code: holder.code.clone(),
    display_name: holder.display_name.clone(),
    extra: extra.to_owned(),
    issued_at_millis: now_millis,
  }
  .encode()
}

// ─── Decoding ────────────────────────────────────────────────────────────────

/// Decode the raw text read from a QR image.
///
/// Surrounding whitespace (scanners often append a line terminator) is
/// ignored. Fields beyond the ones a format defines are ignored as well.
pub fn decode(raw: &str) -> Result<QrPayload, MalformedPayload> {
  let raw = raw.trim();
  if raw.is_empty() {
    return Err(MalformedPayload::Empty);
  }

  if raw.starts_with(ATTENDANCE_PREFIX) {
    decode_attendance(raw).map(QrPayload::Attendance)
  } else if raw.contains(BADGE_DELIMITER) {
    decode_badge(raw).map(QrPayload::Badge)
  } else {
    Err(MalformedPayload::UnknownFormat)
  }
}

fn decode_attendance(raw: &str) -> Result<AttendancePayload, MalformedPayload> {
  let tokens: Vec<&str> = raw.split(ATTENDANCE_DELIMITER).collect();
  // The prefix itself occupies the first two tokens.
  let [_, _, subject_code, context_code, timestamp, ..] = tokens[..] else {
    return Err(MalformedPayload::TooFewFields {
      expected: ATTENDANCE_MIN_FIELDS,
      found:    tokens.len(),
    });
  };

  Ok(AttendancePayload {
    subject_code:     subject_code.to_owned(),
    context_code:     context_code.to_owned(),
    issued_at_millis: parse_timestamp(timestamp)?,
  })
}

fn decode_badge(raw: &str) -> Result<ProfileBadgePayload, MalformedPayload> {
  let tokens: Vec<&str> = raw.split(BADGE_DELIMITER).collect();
  let [kind, subject_id, subject_code, display_name, extra, timestamp, ..] = tokens[..]
  else {
    return Err(MalformedPayload::TooFewFields {
      expected: BADGE_MIN_FIELDS,
      found:    tokens.len(),
    });
  };

  let kind = BadgeKind::from_str(kind)
    .map_err(|_| MalformedPayload::UnknownBadgeKind(kind.to_owned()))?;

  Ok(ProfileBadgePayload {
    kind,
    subject_id: subject_id.to_owned(),
    subject_code: subject_code.to_owned(),
    display_name: display_name.to_owned(),
    extra: extra.to_owned(),
    issued_at_millis: parse_timestamp(timestamp)?,
  })
}

fn parse_timestamp(token: &str) -> Result<i64, MalformedPayload> {
  token
    .parse()
    .map_err(|_| MalformedPayload::InvalidTimestamp(token.to_owned()))
}

fn check_field(
  field: &'static str,
  value: &str,
  delimiter: char,
) -> Result<(), MalformedPayload> {
  if value.contains(delimiter) {
    return Err(MalformedPayload::DelimiterInField { field, delimiter });
  }
  Ok(())
}
