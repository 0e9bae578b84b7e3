//! Error types for `roll-core`.

use thiserror::Error;

/// Why a scanned string could not be decoded into a [`QrPayload`].
///
/// Only the presence of this error reaches the operator (as
/// [`CheckinResult::MalformedPayload`]); the reason is kept for logs.
///
/// [`QrPayload`]: crate::payload::QrPayload
/// [`CheckinResult::MalformedPayload`]: crate::outcome::CheckinResult::MalformedPayload
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedPayload {
  #[error("payload is empty")]
  Empty,

  #[error("unrecognised payload format")]
  UnknownFormat,

  #[error("expected at least {expected} fields, found {found}")]
  TooFewFields { expected: usize, found: usize },

  #[error("invalid issuance timestamp: {0:?}")]
  InvalidTimestamp(String),

  #[error("unknown badge kind: {0:?}")]
  UnknownBadgeKind(String),

  #[error("field `{field}` contains the delimiter {delimiter:?}")]
  DelimiterInField { field: &'static str, delimiter: char },
}

#[derive(Debug, Error)]
pub enum Error {
  /// A collaborator (directory or attendance store) failed. Fatal to the
  /// current check-in attempt only; the operator may re-scan.
  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("timestamp out of range: {0} ms")]
  TimestampOutOfRange(i64),
}

impl Error {
  pub fn persistence<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
