//! SQL schema for the Scorebook SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- One row per (class, student, subject). Upserts replace by that key.
CREATE TABLE IF NOT EXISTS scores (
    class         TEXT    NOT NULL,
    serial_number INTEGER NOT NULL,
    student_name  TEXT    NOT NULL,
    subject       TEXT    NOT NULL,   -- as entered by the teacher
    subject_key   TEXT    NOT NULL,   -- trimmed + upper-cased subject
    ca1           REAL    NOT NULL DEFAULT 0,
    ca2           REAL    NOT NULL DEFAULT 0,
    exam          REAL    NOT NULL DEFAULT 0,
    total         REAL    NOT NULL DEFAULT 0,   -- always ca1 + ca2 + exam
    updated_at    TEXT    NOT NULL,             -- ISO 8601 UTC
    PRIMARY KEY (class, serial_number, subject_key)
);

CREATE TABLE IF NOT EXISTS subjects (
    class         TEXT PRIMARY KEY,
    position      INTEGER NOT NULL,   -- catalog display order
    subjects_json TEXT NOT NULL,      -- JSON array of subject names
    max_total     REAL                -- fixed grand-total denominator or NULL
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS logs (
    log_id    TEXT PRIMARY KEY,
    timestamp TEXT NOT NULL,
    action    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS logs_timestamp_idx ON logs(timestamp);

PRAGMA user_version = 1;
";
