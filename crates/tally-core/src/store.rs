//! The `ScoreStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `tally-store-sqlite`).
//! Higher layers (`tally-api`) depend on this abstraction, not on any
//! concrete backend.

use std::future::Future;

use crate::{
  DomainError,
  rank::{NewRankTier, RankId, RankPatch, RankTier},
  record::{
    BatchItem, RecordId, RecordPage, RecordQuery, ResetSummary, ScoreAdjustment,
    ScoreChange, ScoreRecord,
  },
  stats::Statistics,
  student::{NewStudent, Student, StudentId, StudentPatch},
  template::{NewTemplate, ScoreTemplate, TemplateId, TemplatePatch},
};

/// Abstraction over a Tally store backend.
///
/// Implementations validate their inputs, so callers may pass raw request
/// bodies straight through. Every operation that touches both a student's
/// score and the record table is atomic: either both writes land or
/// neither does.
///
/// Mutations addressing a missing row fail with the matching
/// `*NotFound` domain error; plain lookups return `None` instead.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait ScoreStore: Send + Sync {
  type Error: DomainError;

  // ── Students ──────────────────────────────────────────────────────────

  /// All students, in leaderboard order.
  fn list_students(
    &self,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Students whose name or student number contains `keyword`.
  fn search_students<'a>(
    &'a self,
    keyword: &'a str,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + 'a;

  /// Number of students with a score strictly greater than `score`.
  fn count_students_above(
    &self,
    score: i64,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send + '_;

  fn create_student(
    &self,
    input: NewStudent,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Create all students or none. A duplicate student number anywhere in
  /// the batch (or already stored) aborts the whole batch.
  fn create_students(
    &self,
    inputs: Vec<NewStudent>,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  fn update_student(
    &self,
    id: StudentId,
    patch: StudentPatch,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  /// Delete a student and every record they own. Returns the number of
  /// records removed.
  fn delete_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Score records ─────────────────────────────────────────────────────

  /// Apply a delta to one student and append the audit record.
  fn adjust_score(
    &self,
    student_id: StudentId,
    adjustment: ScoreAdjustment,
  ) -> impl Future<Output = Result<ScoreChange, Self::Error>> + Send + '_;

  /// Apply the same delta to each listed student in one transaction.
  /// Unknown students are reported as skipped rather than failing the batch.
  fn batch_adjust(
    &self,
    student_ids: Vec<StudentId>,
    adjustment: ScoreAdjustment,
  ) -> impl Future<Output = Result<Vec<BatchItem>, Self::Error>> + Send + '_;

  /// Delete a record and reverse its value on the owning student. Undoing
  /// a record twice fails with `RecordNotFound` the second time.
  fn undo_record(
    &self,
    id: RecordId,
  ) -> impl Future<Output = Result<ScoreChange, Self::Error>> + Send + '_;

  /// Up to `limit` of a student's records, newest first.
  fn recent_records(
    &self,
    student_id: StudentId,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<ScoreRecord>, Self::Error>> + Send + '_;

  fn list_records(
    &self,
    query: RecordQuery,
  ) -> impl Future<Output = Result<RecordPage, Self::Error>> + Send + '_;

  /// Zero every score and delete every record.
  fn reset_scores(
    &self,
  ) -> impl Future<Output = Result<ResetSummary, Self::Error>> + Send + '_;

  fn statistics(
    &self,
  ) -> impl Future<Output = Result<Statistics, Self::Error>> + Send + '_;

  // ── Templates ─────────────────────────────────────────────────────────

  fn list_templates(
    &self,
  ) -> impl Future<Output = Result<Vec<ScoreTemplate>, Self::Error>> + Send + '_;

  fn create_template(
    &self,
    input: NewTemplate,
  ) -> impl Future<Output = Result<ScoreTemplate, Self::Error>> + Send + '_;

  fn update_template(
    &self,
    id: TemplateId,
    patch: TemplatePatch,
  ) -> impl Future<Output = Result<ScoreTemplate, Self::Error>> + Send + '_;

  fn delete_template(
    &self,
    id: TemplateId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Rank tiers ────────────────────────────────────────────────────────

  /// All tiers, ascending by threshold.
  fn list_ranks(
    &self,
  ) -> impl Future<Output = Result<Vec<RankTier>, Self::Error>> + Send + '_;

  /// Fails with `DuplicateThreshold` if another tier has the same
  /// `min_score`.
  fn create_rank(
    &self,
    input: NewRankTier,
  ) -> impl Future<Output = Result<RankTier, Self::Error>> + Send + '_;

  fn update_rank(
    &self,
    id: RankId,
    patch: RankPatch,
  ) -> impl Future<Output = Result<RankTier, Self::Error>> + Send + '_;

  fn delete_rank(
    &self,
    id: RankId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
