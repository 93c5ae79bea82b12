//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings with microsecond precision
//! and a `Z` suffix, so lexical order matches chronological order.

use chrono::{DateTime, SecondsFormat, SubsecRound as _, Utc};
use tally_core::{
  rank::RankTier,
  record::{RecordEntry, ScoreRecord},
  student::Student,
  template::ScoreTemplate,
};

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

/// The current time, truncated to the precision that survives a round trip
/// through [`encode_dt`].
pub fn timestamp() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Constraint errors ───────────────────────────────────────────────────────

/// `true` if `e` is a `UNIQUE` constraint violation.
pub fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── Column lists ────────────────────────────────────────────────────────────

pub const STUDENT_COLUMNS: &str =
  "id, student_no, name, score, created_at, updated_at";

pub const RECORD_COLUMNS: &str =
  "id, student_id, value, reason, category, created_at";

pub const TEMPLATE_COLUMNS: &str = "id, name, value, category";

pub const RANK_COLUMNS: &str = "id, name, min_score, color, icon, sort_order";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `students` row.
pub struct RawStudent {
  pub id:         i64,
  pub student_no: String,
  pub name:       String,
  pub score:      i64,
  pub created_at: String,
  pub updated_at: String,
}

impl RawStudent {
  /// Read [`STUDENT_COLUMNS`] starting at column `base`.
  pub fn from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(base)?,
      student_no: row.get(base + 1)?,
      name:       row.get(base + 2)?,
      score:      row.get(base + 3)?,
      created_at: row.get(base + 4)?,
      updated_at: row.get(base + 5)?,
    })
  }

  pub fn into_student(self) -> Result<Student> {
    Ok(Student {
      id:         self.id,
      student_no: self.student_no,
      name:       self.name,
      score:      self.score,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw values read directly from a `score_records` row.
pub struct RawRecord {
  pub id:         i64,
  pub student_id: i64,
  pub value:      i64,
  pub reason:     String,
  pub category:   String,
  pub created_at: String,
}

impl RawRecord {
  /// Read [`RECORD_COLUMNS`] starting at column `base`.
  pub fn from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(base)?,
      student_id: row.get(base + 1)?,
      value:      row.get(base + 2)?,
      reason:     row.get(base + 3)?,
      category:   row.get(base + 4)?,
      created_at: row.get(base + 5)?,
    })
  }

  pub fn into_record(self) -> Result<ScoreRecord> {
    Ok(ScoreRecord {
      id:         self.id,
      student_id: self.student_id,
      value:      self.value,
      reason:     self.reason,
      category:   self.category,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// A record row joined with its student row.
pub struct RawRecordEntry {
  pub record:  RawRecord,
  pub student: RawStudent,
}

impl RawRecordEntry {
  /// Expects [`RECORD_COLUMNS`] followed by [`STUDENT_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record:  RawRecord::from_row(row, 0)?,
      student: RawStudent::from_row(row, 6)?,
    })
  }

  pub fn into_entry(self) -> Result<RecordEntry> {
    Ok(RecordEntry {
      record:  self.record.into_record()?,
      student: self.student.into_student()?,
    })
  }
}

// Templates and ranks hold no encoded columns, so they are read straight
// into the domain type.

pub fn template_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ScoreTemplate> {
  Ok(ScoreTemplate {
    id:       row.get(0)?,
    name:     row.get(1)?,
    value:    row.get(2)?,
    category: row.get(3)?,
  })
}

pub fn rank_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RankTier> {
  Ok(RankTier {
    id:         row.get(0)?,
    name:       row.get(1)?,
    min_score:  row.get(2)?,
    color:      row.get(3)?,
    icon:       row.get(4)?,
    sort_order: row.get(5)?,
  })
}
