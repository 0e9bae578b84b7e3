//! In-memory collaborator used by the unit tests of this crate.

use std::{
  collections::HashMap,
  sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
  },
};

use thiserror::Error;

use crate::{
  attendance::{AttendanceId, AttendanceRecord, NewAttendance},
  context::{ContextId, ContextKind, ContextRef},
  store::{AttendanceStore, ContextDirectory, StoreBackend, StoreError, SubjectDirectory},
  subject::{SubjectId, SubjectKind, SubjectRef},
};

#[derive(Debug, Error)]
#[error("fake store failure")]
pub struct FakeError;

impl StoreError for FakeError {}

#[derive(Default)]
pub struct MemoryStore {
  subjects:     Mutex<HashMap<String, SubjectRef>>,
  contexts:     Mutex<HashMap<String, (ContextRef, bool)>>,
  records:      Mutex<Vec<AttendanceRecord>>,
  inserts:      AtomicUsize,
  lookups:      AtomicUsize,
  fail_inserts: AtomicBool,
  fail_lookups: AtomicBool,
}

impl MemoryStore {
  pub fn add_subject(&self, code: &str, id: SubjectId, kind: SubjectKind) {
    self
      .subjects
      .lock()
      .unwrap()
      .insert(code.to_owned(), SubjectRef { id, kind });
  }

  pub fn add_context(&self, code: &str, id: ContextId, kind: ContextKind, active: bool) {
    self
      .contexts
      .lock()
      .unwrap()
      .insert(code.to_owned(), (ContextRef { id, kind }, active));
  }

  pub fn records(&self) -> Vec<AttendanceRecord> { self.records.lock().unwrap().clone() }

  pub fn insert_calls(&self) -> usize { self.inserts.load(Ordering::SeqCst) }

  pub fn lookup_calls(&self) -> usize { self.lookups.load(Ordering::SeqCst) }

  pub fn fail_inserts(&self) { self.fail_inserts.store(true, Ordering::SeqCst) }

  pub fn fail_lookups(&self) { self.fail_lookups.store(true, Ordering::SeqCst) }

  fn lookup(&self) -> Result<(), FakeError> {
    self.lookups.fetch_add(1, Ordering::SeqCst);
    if self.fail_lookups.load(Ordering::SeqCst) {
      return Err(FakeError);
    }
    Ok(())
  }
}

impl StoreBackend for MemoryStore {
  type Error = FakeError;
}

impl SubjectDirectory for MemoryStore {
  async fn find_subject_by_code(&self, code: &str) -> Result<Option<SubjectRef>, FakeError> {
    self.lookup()?;
    Ok(self.subjects.lock().unwrap().get(code).copied())
  }
}

impl ContextDirectory for MemoryStore {
  async fn find_context_by_code(&self, code: &str) -> Result<Option<ContextRef>, FakeError> {
    self.lookup()?;
    Ok(self.contexts.lock().unwrap().get(code).map(|(c, _)| *c))
  }

  async fn is_context_active(&self, id: ContextId) -> Result<bool, FakeError> {
    self.lookup()?;
    Ok(
      self
        .contexts
        .lock()
        .unwrap()
        .values()
        .any(|(c, active)| c.id == id && *active),
    )
  }
}

impl AttendanceStore for MemoryStore {
  async fn exists(&self, subject: SubjectId, context: ContextId) -> Result<bool, FakeError> {
    self.lookup()?;
    Ok(
      self
        .records
        .lock()
        .unwrap()
        .iter()
        .any(|r| r.subject_id == subject && r.context_id == context),
    )
  }

  async fn insert(&self, record: NewAttendance) -> Result<AttendanceId, FakeError> {
    self.inserts.fetch_add(1, Ordering::SeqCst);
    if self.fail_inserts.load(Ordering::SeqCst) {
      return Err(FakeError);
    }
    let mut records = self.records.lock().unwrap();
    let id = AttendanceId(records.len() as i64 + 1);
    records.push(AttendanceRecord::from_new(id, record));
    Ok(id)
  }
}
