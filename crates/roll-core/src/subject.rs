//! Subjects: the students and teachers whose attendance is recorded.
//!
//! The subject directory is owned by the registry; check-in only resolves a
//! subject's unique code to a [`SubjectRef`].

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Durable identifier of a subject row.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SubjectId(pub i64);

impl fmt::Display for SubjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// The kind of person a subject represents.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubjectKind {
  Student,
  Teacher,
}

/// What a directory lookup yields: enough to record attendance against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
  pub id:   SubjectId,
  pub kind: SubjectKind,
}

/// A registered subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:           SubjectId,
  /// Unique human-facing code (student or teacher code).
  pub code:         String,
  pub kind:         SubjectKind,
  pub display_name: String,
  /// Inactive subjects do not resolve during check-in.
  pub active:       bool,
}

impl Subject {
  pub fn to_ref(&self) -> SubjectRef { SubjectRef { id: self.id, kind: self.kind } }
}

/// Input for registering a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSubject {
  pub code:         String,
  pub kind:         SubjectKind,
  pub display_name: String,
}

impl NewSubject {
  pub fn student(code: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self { code: code.into(), kind: SubjectKind::Student, display_name: display_name.into() }
  }

  pub fn teacher(code: impl Into<String>, display_name: impl Into<String>) -> Self {
    Self { code: code.into(), kind: SubjectKind::Teacher, display_name: display_name.into() }
  }
}
