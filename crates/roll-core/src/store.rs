//! Collaborator traits consumed by check-in, plus the registry that owns
//! subjects and contexts.
//!
//! The traits are implemented by storage backends (e.g. `roll-store-sqlite`).
//! Check-in depends on these abstractions only; it never sees SQL. All four
//! share the [`StoreBackend`] error type so one backend can implement every
//! role behind a single `S::Error`.

use std::future::Future;

use crate::{
  attendance::{AttendanceId, AttendanceRecord, CheckinMethod, NewAttendance},
  context::{Context, ContextId, ContextRef, NewContext},
  subject::{NewSubject, Subject, SubjectId, SubjectRef},
};

/// Error type of a storage backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// Whether the write collided with an existing unique key (a subject or
  /// context code registered twice, a second QR record for a pair).
  fn is_conflict(&self) -> bool { false }
}

/// Common error type of a storage backend.
pub trait StoreBackend: Send + Sync {
  type Error: StoreError;
}

// ─── Check-in collaborators ──────────────────────────────────────────────────

pub trait SubjectDirectory: StoreBackend {
  /// Resolve a unique subject code. Inactive subjects resolve to `None`.
  fn find_subject_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<SubjectRef>, Self::Error>> + Send + 'a;
}

pub trait ContextDirectory: StoreBackend {
  /// Resolve a short context code (e.g. `IG234`) to its durable identifier.
  fn find_context_by_code<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<ContextRef>, Self::Error>> + Send + 'a;

  /// `false` for contexts that are deactivated or no longer exist.
  fn is_context_active(
    &self,
    id: ContextId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}

pub trait AttendanceStore: StoreBackend {
  /// Whether any attendance record links `subject` to `context`.
  fn exists(
    &self,
    subject: SubjectId,
    context: ContextId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert one record. A single-row insert; it either lands or it doesn't.
  fn insert(
    &self,
    record: NewAttendance,
  ) -> impl Future<Output = Result<AttendanceId, Self::Error>> + Send + '_;
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Filter for [`Registry::list_attendance`].
#[derive(Debug, Clone, Default)]
pub struct AttendanceQuery {
  pub subject_id: Option<SubjectId>,
  pub context_id: Option<ContextId>,
  pub method:     Option<CheckinMethod>,
  pub limit:      Option<usize>,
  pub offset:     Option<usize>,
}

/// Ownership of subjects and contexts, and read access to attendance.
pub trait Registry: StoreBackend {
  /// Register a subject. Codes are unique; a duplicate is an error.
  fn add_subject(
    &self,
    input: NewSubject,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  fn get_subject<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  fn set_subject_active<'a>(
    &'a self,
    code: &'a str,
    active: bool,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  /// Register a context. New contexts are active.
  fn add_context(
    &self,
    input: NewContext,
  ) -> impl Future<Output = Result<Context, Self::Error>> + Send + '_;

  fn get_context<'a>(
    &'a self,
    code: &'a str,
  ) -> impl Future<Output = Result<Option<Context>, Self::Error>> + Send + 'a;

  /// Returns the updated context, or `None` if `code` is unknown.
  fn set_context_active<'a>(
    &'a self,
    code: &'a str,
    active: bool,
  ) -> impl Future<Output = Result<Option<Context>, Self::Error>> + Send + 'a;

  /// Records matching `query`, oldest first.
  fn list_attendance<'a>(
    &'a self,
    query: &'a AttendanceQuery,
  ) -> impl Future<Output = Result<Vec<AttendanceRecord>, Self::Error>> + Send + 'a;
}
