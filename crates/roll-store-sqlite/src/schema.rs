//! SQL schema for the Roll SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! layout; future migrations will be gated on it.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS subjects (
    subject_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    code         TEXT    NOT NULL UNIQUE,
    kind         TEXT    NOT NULL,            -- 'student' | 'teacher'
    display_name TEXT    NOT NULL,
    active       INTEGER NOT NULL DEFAULT 1,
    created_at   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS contexts (
    context_id INTEGER PRIMARY KEY AUTOINCREMENT,
    code       TEXT    NOT NULL UNIQUE,       -- printed in QR payloads
    kind       TEXT    NOT NULL,              -- 'course' | 'event'
    name       TEXT    NOT NULL,
    active     INTEGER NOT NULL DEFAULT 1,
    created_at TEXT    NOT NULL
);

-- Check-in only ever inserts into this table.
CREATE TABLE IF NOT EXISTS attendance (
    attendance_id INTEGER PRIMARY KEY AUTOINCREMENT,
    subject_id    INTEGER NOT NULL REFERENCES subjects(subject_id),
    context_id    INTEGER NOT NULL REFERENCES contexts(context_id),
    event_id      INTEGER          REFERENCES contexts(context_id),
    status        TEXT    NOT NULL DEFAULT 'present',
    method        TEXT    NOT NULL DEFAULT 'manual',
    recorded_at   TEXT    NOT NULL,       -- RFC 3339 UTC, millisecond precision
    notes         TEXT
);

-- One QR check-in per subject and context, whichever station wins.
CREATE UNIQUE INDEX IF NOT EXISTS attendance_qr_once
    ON attendance(subject_id, context_id) WHERE method = 'qr';

CREATE INDEX IF NOT EXISTS attendance_pair_idx    ON attendance(subject_id, context_id);
CREATE INDEX IF NOT EXISTS attendance_context_idx ON attendance(context_id);

PRAGMA user_version = 1;
";
