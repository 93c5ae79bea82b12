//! Students — the owners of a running score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Result,
  error::{optional_text, require_text},
};

pub type StudentId = i64;

/// A student and their current score.
///
/// `score` is only ever changed together with a [`ScoreRecord`] insert or
/// delete, so it always equals the sum of the student's record values
/// (unless the store was reset, which clears both).
///
/// [`ScoreRecord`]: crate::record::ScoreRecord
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id:         StudentId,
  /// School-assigned number; unique across all students.
  pub student_no: String,
  pub name:       String,
  pub score:      i64,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Input for creating a student. New students always start at score 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
  pub student_no: String,
  pub name:       String,
}

impl NewStudent {
  pub fn new(student_no: impl Into<String>, name: impl Into<String>) -> Self {
    Self { student_no: student_no.into(), name: name.into() }
  }

  /// Trim both fields and reject blanks.
  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      student_no: require_text("student_no", self.student_no)?,
      name:       require_text("name", self.name)?,
    })
  }
}

/// Partial update for a student. Missing or blank fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StudentPatch {
  pub student_no: Option<String>,
  pub name:       Option<String>,
}

impl StudentPatch {
  /// Trim both fields, dropping any that end up blank.
  pub fn normalized(self) -> Self {
    Self {
      student_no: optional_text(self.student_no),
      name:       optional_text(self.name),
    }
  }

  pub fn is_empty(&self) -> bool { self.student_no.is_none() && self.name.is_none() }
}

/// Normalise a search keyword; blank keywords are rejected.
pub fn search_keyword(keyword: &str) -> Result<String> {
  require_text("keyword", keyword.to_owned())
}
