//! Attendance recorder: the one durable write of a successful check-in.

use chrono::{DateTime, Utc};

use crate::{
  Error, Result,
  attendance::{AttendanceId, CheckinMethod, NewAttendance},
  context::ContextRef,
  store::AttendanceStore,
  subject::SubjectRef,
};

/// Insert a `Present` record for `subject` in `context`.
///
/// Store failures (constraint violations, I/O) come back as
/// [`Error::Persistence`]; nothing is retried here.
pub async fn record<S>(
  store: &S,
  subject: SubjectRef,
  context: ContextRef,
  method: CheckinMethod,
  recorded_at: DateTime<Utc>,
) -> Result<AttendanceId>
where
  S: AttendanceStore,
{
  let input = NewAttendance::present(subject, context, method, recorded_at);
  let id = store.insert(input).await.map_err(Error::persistence)?;

  tracing::info!(
    attendance_id = %id,
    subject_id = %subject.id,
    context_id = %context.id,
    method = method.as_ref(),
    "attendance recorded"
  );
  Ok(id)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    attendance::AttendanceStatus,
    context::{ContextId, ContextKind},
    fake::MemoryStore,
    subject::{SubjectId, SubjectKind},
  };

  fn refs() -> (SubjectRef, ContextRef) {
    (
      SubjectRef { id: SubjectId(42), kind: SubjectKind::Student },
      ContextRef { id: ContextId(1), kind: ContextKind::Event },
    )
  }

  #[tokio::test]
  async fn inserts_present_qr_record() {
    let store = MemoryStore::default();
    let (subject, context) = refs();
    let at = Utc::now();

    let id = record(&store, subject, context, CheckinMethod::Qr, at).await.unwrap();

    let rows = store.records();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, id);
    assert_eq!(rows[0].subject_id, SubjectId(42));
    assert_eq!(rows[0].context_id, ContextId(1));
    assert_eq!(rows[0].status, AttendanceStatus::Present);
    assert_eq!(rows[0].method, CheckinMethod::Qr);
    assert_eq!(rows[0].recorded_at, at);
  }

  #[tokio::test]
  async fn store_failure_is_persistence_error() {
    let store = MemoryStore::default();
    store.fail_inserts();
    let (subject, context) = refs();

    let err = record(&store, subject, context, CheckinMethod::Qr, Utc::now())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Persistence(_)));
    assert!(store.records().is_empty());
  }
}
