//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS students (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    student_no  TEXT    NOT NULL UNIQUE,
    name        TEXT    NOT NULL,
    score       INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT    NOT NULL,   -- RFC 3339 UTC
    updated_at  TEXT    NOT NULL
);

-- Rows are inserted by score adjustments and deleted by undo or reset;
-- never updated.
CREATE TABLE IF NOT EXISTS score_records (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id  INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    value       INTEGER NOT NULL CHECK (value != 0),
    reason      TEXT    NOT NULL DEFAULT '',
    category    TEXT    NOT NULL DEFAULT '',
    created_at  TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS score_templates (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    value       INTEGER NOT NULL,
    category    TEXT    NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS ranks (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT    NOT NULL,
    min_score   INTEGER NOT NULL UNIQUE CHECK (min_score >= 0),
    color       TEXT    NOT NULL DEFAULT '',
    icon        TEXT    NOT NULL DEFAULT '',
    sort_order  INTEGER NOT NULL DEFAULT 0
);

-- Reserved for runtime settings; no endpoint reads it yet.
CREATE TABLE IF NOT EXISTS settings (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    key         TEXT    NOT NULL UNIQUE,
    value       TEXT    NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS records_student_idx  ON score_records(student_id);
CREATE INDEX IF NOT EXISTS records_category_idx ON score_records(category);
CREATE INDEX IF NOT EXISTS records_created_idx  ON score_records(created_at);

PRAGMA user_version = 1;
";
