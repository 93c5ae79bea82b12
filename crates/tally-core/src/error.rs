//! Error types for `tally-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("student not found: {0}")]
  StudentNotFound(i64),

  #[error("score record not found: {0}")]
  RecordNotFound(i64),

  #[error("score template not found: {0}")]
  TemplateNotFound(i64),

  #[error("rank tier not found: {0}")]
  RankNotFound(i64),

  #[error("student number {0:?} is already taken")]
  DuplicateStudentNo(String),

  #[error("a rank tier with threshold {0} already exists")]
  DuplicateThreshold(i64),

  #[error("invalid input: {0}")]
  Invalid(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Implemented by backend error types so that callers holding only a
/// [`ScoreStore`](crate::store::ScoreStore) can tell domain failures
/// (not-found, duplicates, bad input) apart from storage failures.
pub trait DomainError: std::error::Error + Send + Sync + 'static {
  /// The domain error carried by `self`, or `None` for infrastructure errors.
  fn domain(&self) -> Option<&Error>;
}

impl DomainError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

/// Trim `value` and reject it if nothing is left.
pub(crate) fn require_text(field: &str, value: String) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    return Err(Error::Invalid(format!("{field} must not be empty")));
  }
  Ok(trimmed.to_owned())
}

/// Trim an optional patch field; a blank value means "leave unchanged".
pub(crate) fn optional_text(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}
