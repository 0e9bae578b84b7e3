//! [`SqliteStore`]: the SQLite implementation of the Roll collaborator
//! traits and registry.

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use roll_core::{
  attendance::{AttendanceId, AttendanceRecord, NewAttendance},
  context::{Context, ContextId, ContextRef, NewContext},
  store::{
    AttendanceQuery, AttendanceStore, ContextDirectory, Registry, StoreBackend,
    SubjectDirectory,
  },
  subject::{NewSubject, Subject, SubjectId, SubjectRef},
};

use crate::{
  Error, Result,
  encode::{RawAttendance, RawContext, RawSubject, context_ref, encode_dt, subject_ref},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roll store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Register a subject under a caller-supplied id, e.g. when importing from
  /// an existing student roster.
  pub async fn add_subject_with_id(&self, id: SubjectId, input: NewSubject) -> Result<Subject> {
    self.insert_subject(Some(id), input).await
  }

  /// Register a context under a caller-supplied id.
  pub async fn add_context_with_id(&self, id: ContextId, input: NewContext) -> Result<Context> {
    self.insert_context(Some(id), input).await
  }

  /// Insert a subject row; `None` lets SQLite assign the id.
  async fn insert_subject(&self, id: Option<SubjectId>, input: NewSubject) -> Result<Subject> {
    let code      = input.code.clone();
    let kind_str  = input.kind.as_ref().to_owned();
    let name      = input.display_name.clone();
    let at_str    = encode_dt(Utc::now());
    let id_val    = id.map(|i| i.0);

    let new_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO subjects (subject_id, code, kind, display_name, active, created_at)
           VALUES (?1, ?2, ?3, ?4, 1, ?5)",
          rusqlite::params![id_val, code, kind_str, name, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| {
        if Error::is_unique_violation(&e) {
          Error::DuplicateSubject(input.code.clone())
        } else {
          Error::Database(e)
        }
      })?;

    Ok(Subject {
      id:           SubjectId(new_id),
      code:         input.code,
      kind:         input.kind,
      display_name: input.display_name,
      active:       true,
    })
  }

  /// Insert a context row; `None` lets SQLite assign the id.
  async fn insert_context(&self, id: Option<ContextId>, input: NewContext) -> Result<Context> {
    let code     = input.code.clone();
    let kind_str = input.kind.as_ref().to_owned();
    let name     = input.name.clone();
    let at_str   = encode_dt(Utc::now());
    let id_val   = id.map(|i| i.0);

    let new_id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO contexts (context_id, code, kind, name, active, created_at)
           VALUES (?1, ?2, ?3, ?4, 1, ?5)",
          rusqlite::params![id_val, code, kind_str, name, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| {
        if Error::is_unique_violation(&e) {
          Error::DuplicateContext(input.code.clone())
        } else {
          Error::Database(e)
        }
      })?;

    Ok(Context {
      id:     ContextId(new_id),
      code:   input.code,
      kind:   input.kind,
      name:   input.name,
      active: true,
    })
  }
}

impl StoreBackend for SqliteStore {
  type Error = Error;
}

// ─── Directories ─────────────────────────────────────────────────────────────

impl SubjectDirectory for SqliteStore {
  async fn find_subject_by_code(&self, code: &str) -> Result<Option<SubjectRef>> {
    let code = code.to_owned();

    let raw: Option<(i64, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subject_id, kind FROM subjects WHERE code = ?1 AND active = 1",
              rusqlite::params![code],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|(id, kind)| subject_ref(id, &kind)).transpose()
  }
}

impl ContextDirectory for SqliteStore {
  async fn find_context_by_code(&self, code: &str) -> Result<Option<ContextRef>> {
    let code = code.to_owned();

    let raw: Option<(i64, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT context_id, kind FROM contexts WHERE code = ?1",
              rusqlite::params![code],
              |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(|(id, kind)| context_ref(id, &kind)).transpose()
  }

  async fn is_context_active(&self, id: ContextId) -> Result<bool> {
    let active: Option<bool> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT active FROM contexts WHERE context_id = ?1",
              rusqlite::params![id.0],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(active.unwrap_or(false))
  }
}

// ─── Attendance ──────────────────────────────────────────────────────────────

impl AttendanceStore for SqliteStore {
  async fn exists(&self, subject: SubjectId, context: ContextId) -> Result<bool> {
    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT EXISTS (
             SELECT 1 FROM attendance WHERE subject_id = ?1 AND context_id = ?2
           )",
          rusqlite::params![subject.0, context.0],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(found)
  }

  async fn insert(&self, record: NewAttendance) -> Result<AttendanceId> {
    let subject_id = record.subject_id.0;
    let context_id = record.context_id.0;
    let event_id   = record.event_id.map(|e| e.0);
    let status     = record.status.as_ref().to_owned();
    let method     = record.method.as_ref().to_owned();
    let at_str     = encode_dt(record.recorded_at);
    let notes      = record.notes;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO attendance (
             subject_id, context_id, event_id, status, method, recorded_at, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![subject_id, context_id, event_id, status, method, at_str, notes],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| {
        if Error::is_unique_violation(&e) {
          tracing::warn!(
            subject_id,
            context_id,
            "QR attendance already recorded by another station"
          );
          Error::DuplicateAttendance { subject: subject_id, context: context_id }
        } else {
          Error::Database(e)
        }
      })?;

    Ok(AttendanceId(id))
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

impl Registry for SqliteStore {
  async fn add_subject(&self, input: NewSubject) -> Result<Subject> {
    self.insert_subject(None, input).await
  }

  async fn get_subject(&self, code: &str) -> Result<Option<Subject>> {
    let code = code.to_owned();
    let sql = format!("SELECT {} FROM subjects WHERE code = ?1", RawSubject::COLUMNS);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![code], RawSubject::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn set_subject_active(&self, code: &str, active: bool) -> Result<Option<Subject>> {
    let code_owned = code.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE subjects SET active = ?2 WHERE code = ?1",
          rusqlite::params![code_owned, active],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_subject(code).await
  }

  async fn add_context(&self, input: NewContext) -> Result<Context> {
    self.insert_context(None, input).await
  }

  async fn get_context(&self, code: &str) -> Result<Option<Context>> {
    let code = code.to_owned();
    let sql = format!("SELECT {} FROM contexts WHERE code = ?1", RawContext::COLUMNS);

    let raw: Option<RawContext> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![code], RawContext::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawContext::into_context).transpose()
  }

  async fn set_context_active(&self, code: &str, active: bool) -> Result<Option<Context>> {
    let code_owned = code.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE contexts SET active = ?2 WHERE code = ?1",
          rusqlite::params![code_owned, active],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.get_context(code).await
  }

  async fn list_attendance(&self, query: &AttendanceQuery) -> Result<Vec<AttendanceRecord>> {
    let subject_id = query.subject_id.map(|s| s.0);
    let context_id = query.context_id.map(|c| c.0);
    let method     = query.method.map(|m| m.as_ref().to_owned());
    // SQLite treats a negative LIMIT as "no limit".
    let limit_val  = query.limit.map_or(-1, saturating_i64);
    let offset_val = query.offset.map_or(0, saturating_i64);
    let sql = format!(
      "SELECT {} FROM attendance
       WHERE (?1 IS NULL OR subject_id = ?1)
         AND (?2 IS NULL OR context_id = ?2)
         AND (?3 IS NULL OR method = ?3)
       ORDER BY attendance_id
       LIMIT ?4 OFFSET ?5",
      RawAttendance::COLUMNS
    );

    let raws: Vec<RawAttendance> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![subject_id, context_id, method, limit_val, offset_val],
            RawAttendance::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAttendance::into_record).collect()
  }
}

fn saturating_i64(n: usize) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }
