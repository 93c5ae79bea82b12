//! Score records — the audit trail of every point adjustment.
//!
//! A record is immutable once written. The only lifecycle event is deletion
//! ("undo"), which reverses the record's value on the owning student.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  student::{Student, StudentId},
};

pub type RecordId = i64;

/// Number of recent records shown on a student's detail view.
pub const RECENT_RECORD_LIMIT: usize = 50;

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Largest magnitude a single adjustment may carry.
pub const MAX_ADJUSTMENT: i64 = 1_000_000;

// ─── Records ─────────────────────────────────────────────────────────────────

/// One signed point adjustment applied to one student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
  pub id:         RecordId,
  pub student_id: StudentId,
  /// Signed delta; never zero.
  pub value:      i64,
  pub reason:     String,
  pub category:   String,
  pub created_at: DateTime<Utc>,
}

/// A record joined with its owning student, as returned by [`RecordPage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEntry {
  #[serde(flatten)]
  pub record:  ScoreRecord,
  pub student: Student,
}

// ─── Adjustments ─────────────────────────────────────────────────────────────

/// The delta and metadata of a score change, shared by single and batch
/// adjustments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAdjustment {
  pub value:    i64,
  #[serde(default)]
  pub reason:   String,
  #[serde(default)]
  pub category: String,
}

impl ScoreAdjustment {
  pub fn new(value: i64) -> Self {
    Self { value, reason: String::new(), category: String::new() }
  }

  pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
    self.reason = reason.into();
    self
  }

  pub fn with_category(mut self, category: impl Into<String>) -> Self {
    self.category = category.into();
    self
  }

  /// A zero delta, or one beyond [`MAX_ADJUSTMENT`] in either direction, is
  /// rejected; reason and category are trimmed.
  pub fn validated(self) -> Result<Self> {
    if self.value == 0 {
      return Err(Error::Invalid("value must not be zero".into()));
    }
    if !(-MAX_ADJUSTMENT..=MAX_ADJUSTMENT).contains(&self.value) {
      return Err(Error::Invalid(format!(
        "value must be within ±{MAX_ADJUSTMENT}, got {}",
        self.value
      )));
    }
    Ok(Self {
      value:    self.value,
      reason:   self.reason.trim().to_owned(),
      category: self.category.trim().to_owned(),
    })
  }
}

/// `score + delta`, or a validation error if the result leaves the `i64`
/// range.
pub fn shifted_score(score: i64, delta: i64) -> Result<i64> {
  score.checked_add(delta).ok_or_else(|| {
    Error::Invalid(format!("adjusting a score of {score} by {delta} is out of range"))
  })
}

/// `score - delta`; the inverse of [`shifted_score`], used by undo.
pub fn unshifted_score(score: i64, delta: i64) -> Result<i64> {
  score.checked_sub(delta).ok_or_else(|| {
    Error::Invalid(format!("undoing {delta} from a score of {score} is out of range"))
  })
}

/// The result of applying or undoing one record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreChange {
  pub record:    ScoreRecord,
  /// The owning student's score after the change was committed.
  pub new_score: i64,
}

/// Why a batch item was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
  StudentNotFound,
}

/// Per-student outcome of a batch adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchItem {
  Applied {
    student_id: StudentId,
    record:     ScoreRecord,
    new_score:  i64,
  },
  Skipped {
    student_id: StudentId,
    reason:     SkipReason,
  },
}

impl BatchItem {
  pub fn student_id(&self) -> StudentId {
    match self {
      Self::Applied { student_id, .. } | Self::Skipped { student_id, .. } => {
        *student_id
      }
    }
  }

  pub fn is_applied(&self) -> bool { matches!(self, Self::Applied { .. }) }
}

/// Reject an empty batch; duplicate ids are kept and applied once each.
pub fn validate_batch(student_ids: &[StudentId]) -> Result<()> {
  if student_ids.is_empty() {
    return Err(Error::Invalid("student_ids must not be empty".into()));
  }
  Ok(())
}

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Filter and page for [`ScoreStore::list_records`](crate::store::ScoreStore::list_records).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordQuery {
  pub student_id: Option<StudentId>,
  pub category:   Option<String>,
  /// 1-based.
  pub page:       u32,
  pub page_size:  u32,
}

impl Default for RecordQuery {
  fn default() -> Self {
    Self { student_id: None, category: None, page: 1, page_size: DEFAULT_PAGE_SIZE }
  }
}

impl RecordQuery {
  /// Build a query from raw request values. Out-of-range pages fall back to
  /// 1 and the page size is clamped to `1..=MAX_PAGE_SIZE`.
  pub fn from_raw(
    page: Option<i64>,
    page_size: Option<i64>,
    student_id: Option<StudentId>,
    category: Option<String>,
  ) -> Self {
    let page = page.filter(|p| *p >= 1).unwrap_or(1);
    let page_size = page_size
      .unwrap_or(DEFAULT_PAGE_SIZE as i64)
      .clamp(1, MAX_PAGE_SIZE as i64);
    Self {
      student_id,
      category: category.filter(|c| !c.is_empty()),
      page: u32::try_from(page).unwrap_or(u32::MAX),
      page_size: page_size as u32,
    }
  }

  pub fn offset(&self) -> i64 {
    (i64::from(self.page) - 1) * i64::from(self.page_size)
  }
}

/// One page of records plus the total count matching the filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPage {
  pub data:      Vec<RecordEntry>,
  pub total:     i64,
  pub page:      u32,
  pub page_size: u32,
}

/// What a full reset removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetSummary {
  pub students_reset:  u64,
  pub records_deleted: u64,
}
