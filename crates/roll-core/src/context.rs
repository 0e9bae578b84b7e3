//! Contexts: the course sessions and events attendance applies to.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Durable identifier of a context row.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContextId(pub i64);

impl fmt::Display for ContextId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContextKind {
  Course,
  Event,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRef {
  pub id:   ContextId,
  pub kind: ContextKind,
}

/// A registered course or event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
  pub id:     ContextId,
  /// Short code printed in attendance QR payloads, e.g. `IG234`.
  pub code:   String,
  pub kind:   ContextKind,
  pub name:   String,
  pub active: bool,
}

impl Context {
  pub fn to_ref(&self) -> ContextRef { ContextRef { id: self.id, kind: self.kind } }
}

/// Input for registering a context. New contexts start active.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContext {
  pub code: String,
  pub kind: ContextKind,
  pub name: String,
}

impl NewContext {
  pub fn event(code: impl Into<String>, name: impl Into<String>) -> Self {
    Self { code: code.into(), kind: ContextKind::Event, name: name.into() }
  }

  pub fn course(code: impl Into<String>, name: impl Into<String>) -> Self {
    Self { code: code.into(), kind: ContextKind::Course, name: name.into() }
  }
}
