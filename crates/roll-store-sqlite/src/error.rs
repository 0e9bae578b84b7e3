//! Error type for `roll-store-sqlite`.

use roll_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unexpected value in column {column}: {value:?}")]
  InvalidColumn { column: &'static str, value: String },

  #[error("subject already registered: {0}")]
  DuplicateSubject(String),

  #[error("context already registered: {0}")]
  DuplicateContext(String),

  /// Lost a race against another station: the partial unique index allows
  /// one QR record per subject and context.
  #[error("QR attendance already recorded for subject {subject} in context {context}")]
  DuplicateAttendance { subject: i64, context: i64 },
}

impl Error {
  /// Whether a database error is a UNIQUE or PRIMARY KEY violation.
  pub(crate) fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
    use rusqlite::ffi::{SQLITE_CONSTRAINT_PRIMARYKEY, SQLITE_CONSTRAINT_UNIQUE};

    matches!(
      err,
      tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
        if e.extended_code == SQLITE_CONSTRAINT_UNIQUE
          || e.extended_code == SQLITE_CONSTRAINT_PRIMARYKEY
    )
  }
}

impl StoreError for Error {
  fn is_conflict(&self) -> bool {
    matches!(
      self,
      Error::DuplicateSubject(_) | Error::DuplicateContext(_) | Error::DuplicateAttendance { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
