//! [`SqliteStore`] — the SQLite implementation of [`ScoreStore`].

use std::path::Path;

use rusqlite::{Connection, OptionalExtension as _, params};
use tally_core::{
  Error as CoreError,
  rank::{NewRankTier, RankId, RankPatch, RankTier},
  record::{
    BatchItem, RecordId, RecordPage, RecordQuery, ResetSummary, ScoreAdjustment,
    ScoreChange, ScoreRecord, SkipReason, shifted_score, unshifted_score,
    validate_batch,
  },
  seed::{RankSeed, default_rank_tiers, default_templates},
  stats::{CategoryStat, Statistics},
  store::ScoreStore,
  student::{NewStudent, Student, StudentId, StudentPatch, search_keyword},
  template::{NewTemplate, ScoreTemplate, TemplateId, TemplatePatch},
};
use tracing::{info, warn};

use crate::{
  Result,
  encode::{
    RANK_COLUMNS, RECORD_COLUMNS, RawRecord, RawRecordEntry, RawStudent,
    STUDENT_COLUMNS, TEMPLATE_COLUMNS, encode_dt, is_unique_violation,
    rank_from_row, template_from_row, timestamp,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

/// What [`SqliteStore::seed`] installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
  pub tiers_installed:     usize,
  pub templates_installed: usize,
}

impl SqliteStore {
  /// Open (or create) a store at `path`, run schema initialisation and seed
  /// default tiers and templates according to `rank_seed`.
  pub async fn open(path: impl AsRef<Path>, rank_seed: RankSeed) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn, rank_seed).await
  }

  /// Open a seeded in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn, RankSeed::SeedOnce).await
  }

  async fn init(conn: tokio_rusqlite::Connection, rank_seed: RankSeed) -> Result<Self> {
    let store = Self { conn };
    store.init_schema().await?;
    let report = store.seed(rank_seed).await?;
    info!(
      tiers = report.tiers_installed,
      templates = report.templates_installed,
      ?rank_seed,
      "store seeded"
    );
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

  /// Install default rank tiers and score templates.
  ///
  /// Templates are only installed into an empty table. Tiers follow
  /// `rank_seed`: [`RankSeed::SeedOnce`] behaves like templates, while
  /// [`RankSeed::Reset`] replaces every existing tier with the defaults.
  pub async fn seed(&self, rank_seed: RankSeed) -> Result<SeedReport> {
    let tiers = default_rank_tiers();
    let templates = default_templates();

    let report = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut report = SeedReport::default();

        if rank_seed == RankSeed::Reset {
          tx.execute("DELETE FROM ranks", [])?;
        }
        let rank_count: i64 =
          tx.query_row("SELECT COUNT(*) FROM ranks", [], |r| r.get(0))?;
        if rank_count == 0 {
          for tier in &tiers {
            insert_rank(&tx, tier)?;
          }
          report.tiers_installed = tiers.len();
        }

        let template_count: i64 =
          tx.query_row("SELECT COUNT(*) FROM score_templates", [], |r| r.get(0))?;
        if template_count == 0 {
          for template in &templates {
            insert_template(&tx, template)?;
          }
          report.templates_installed = templates.len();
        }

        tx.commit()?;
        Ok(report)
      })
      .await?;

    Ok(report)
  }
}

// ─── Row helpers ─────────────────────────────────────────────────────────────
//
// These run inside `tokio_rusqlite` closures, usually on a transaction
// (which derefs to `Connection`).

fn fetch_student(conn: &Connection, id: StudentId) -> rusqlite::Result<Option<RawStudent>> {
  conn
    .query_row(
      &format!("SELECT {STUDENT_COLUMNS} FROM students WHERE id = ?1"),
      params![id],
      |row| RawStudent::from_row(row, 0),
    )
    .optional()
}

fn fetch_record(conn: &Connection, id: RecordId) -> rusqlite::Result<Option<RawRecord>> {
  conn
    .query_row(
      &format!("SELECT {RECORD_COLUMNS} FROM score_records WHERE id = ?1"),
      params![id],
      |row| RawRecord::from_row(row, 0),
    )
    .optional()
}

fn student_score(conn: &Connection, id: StudentId) -> rusqlite::Result<i64> {
  conn.query_row("SELECT score FROM students WHERE id = ?1", params![id], |r| r.get(0))
}

/// Add `adjustment.value` to a student's score and append the matching
/// record. Yields `Ok(None)` (and writes nothing) if the student is missing,
/// and a validation error if the new score would leave the `i64` range.
fn apply_delta(
  conn: &Connection,
  student_id: StudentId,
  adjustment: &ScoreAdjustment,
  now: &str,
) -> rusqlite::Result<Result<Option<(RawRecord, i64)>, CoreError>> {
  let Some(score) = student_score(conn, student_id).optional()? else {
    return Ok(Ok(None));
  };
  let new_score = match shifted_score(score, adjustment.value) {
    Ok(new_score) => new_score,
    Err(e) => return Ok(Err(e)),
  };

  conn.execute(
    "UPDATE students SET score = ?1, updated_at = ?2 WHERE id = ?3",
    params![new_score, now, student_id],
  )?;
  conn.execute(
    "INSERT INTO score_records (student_id, value, reason, category, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![
      student_id,
      adjustment.value,
      adjustment.reason,
      adjustment.category,
      now,
    ],
  )?;

  let record = RawRecord {
    id:         conn.last_insert_rowid(),
    student_id,
    value:      adjustment.value,
    reason:     adjustment.reason.clone(),
    category:   adjustment.category.clone(),
    created_at: now.to_owned(),
  };
  Ok(Ok(Some((record, new_score))))
}

fn insert_rank(conn: &Connection, input: &NewRankTier) -> rusqlite::Result<RankTier> {
  let sort_order = match input.sort_order {
    Some(s) => s,
    None => conn.query_row(
      "SELECT COALESCE(MAX(sort_order), 0) + 1 FROM ranks",
      [],
      |r| r.get(0),
    )?,
  };
  conn.execute(
    "INSERT INTO ranks (name, min_score, color, icon, sort_order)
     VALUES (?1, ?2, ?3, ?4, ?5)",
    params![input.name, input.min_score, input.color, input.icon, sort_order],
  )?;
  Ok(RankTier {
    id: conn.last_insert_rowid(),
    name: input.name.clone(),
    min_score: input.min_score,
    color: input.color.clone(),
    icon: input.icon.clone(),
    sort_order,
  })
}

fn insert_template(conn: &Connection, input: &NewTemplate) -> rusqlite::Result<ScoreTemplate> {
  conn.execute(
    "INSERT INTO score_templates (name, value, category) VALUES (?1, ?2, ?3)",
    params![input.name, input.value, input.category],
  )?;
  Ok(ScoreTemplate {
    id:       conn.last_insert_rowid(),
    name:     input.name.clone(),
    value:    input.value,
    category: input.category.clone(),
  })
}

fn insert_student(conn: &Connection, input: &NewStudent, now: &str) -> rusqlite::Result<RawStudent> {
  conn.execute(
    "INSERT INTO students (student_no, name, score, created_at, updated_at)
     VALUES (?1, ?2, 0, ?3, ?3)",
    params![input.student_no, input.name, now],
  )?;
  Ok(RawStudent {
    id:         conn.last_insert_rowid(),
    student_no: input.student_no.clone(),
    name:       input.name.clone(),
    score:      0,
    created_at: now.to_owned(),
    updated_at: now.to_owned(),
  })
}

/// Escape `%`, `_` and `\` so `s` matches literally inside `LIKE … ESCAPE '\'`.
fn like_pattern(s: &str) -> String {
  let mut escaped = String::with_capacity(s.len() + 2);
  escaped.push('%');
  for c in s.chars() {
    if matches!(c, '%' | '_' | '\\') {
      escaped.push('\\');
    }
    escaped.push(c);
  }
  escaped.push('%');
  escaped
}

fn decode_students(raws: Vec<RawStudent>) -> Result<Vec<Student>> {
  raws.into_iter().map(RawStudent::into_student).collect()
}

// ─── ScoreStore impl ─────────────────────────────────────────────────────────

impl ScoreStore for SqliteStore {
  type Error = crate::Error;

  // ── Students ──────────────────────────────────────────────────────────────

  async fn list_students(&self) -> Result<Vec<Student>> {
    let raws: Vec<RawStudent> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STUDENT_COLUMNS} FROM students ORDER BY score DESC, student_no ASC"
        ))?;
        let rows = stmt
          .query_map([], |row| RawStudent::from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    decode_students(raws)
  }

  async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
    let raw = self.conn.call(move |conn| Ok(fetch_student(conn, id)?)).await?;
    raw.map(RawStudent::into_student).transpose()
  }

  async fn search_students<'a>(&'a self, keyword: &'a str) -> Result<Vec<Student>> {
    let pattern = like_pattern(&search_keyword(keyword)?);

    let raws: Vec<RawStudent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {STUDENT_COLUMNS} FROM students
           WHERE name LIKE ?1 ESCAPE '\\' OR student_no LIKE ?1 ESCAPE '\\'
           ORDER BY score DESC, student_no ASC"
        ))?;
        let rows = stmt
          .query_map(params![pattern], |row| RawStudent::from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    decode_students(raws)
  }

  async fn count_students_above(&self, score: i64) -> Result<i64> {
    let count = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM students WHERE score > ?1",
          params![score],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count)
  }

  async fn create_student(&self, input: NewStudent) -> Result<Student> {
    let input = input.validated()?;
    let now = encode_dt(timestamp());

    let outcome: Result<RawStudent, CoreError> = self
      .conn
      .call(move |conn| match insert_student(conn, &input, &now) {
        Ok(raw) => Ok(Ok(raw)),
        Err(e) if is_unique_violation(&e) => {
          Ok(Err(CoreError::DuplicateStudentNo(input.student_no)))
        }
        Err(e) => Err(e.into()),
      })
      .await?;

    outcome?.into_student()
  }

  async fn create_students(&self, inputs: Vec<NewStudent>) -> Result<Vec<Student>> {
    let inputs = inputs
      .into_iter()
      .map(NewStudent::validated)
      .collect::<Result<Vec<_>, _>>()?;
    let now = encode_dt(timestamp());

    let outcome: Result<Vec<RawStudent>, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut raws = Vec::with_capacity(inputs.len());
        for input in &inputs {
          match insert_student(&tx, input, &now) {
            Ok(raw) => raws.push(raw),
            // Dropping `tx` rolls back every insert made so far.
            Err(e) if is_unique_violation(&e) => {
              return Ok(Err(CoreError::DuplicateStudentNo(input.student_no.clone())));
            }
            Err(e) => return Err(e.into()),
          }
        }
        tx.commit()?;
        Ok(Ok(raws))
      })
      .await?;

    decode_students(outcome?)
  }

  async fn update_student(&self, id: StudentId, patch: StudentPatch) -> Result<Student> {
    let patch = patch.normalized();
    let now = encode_dt(timestamp());

    let outcome: Result<RawStudent, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut raw) = fetch_student(&tx, id)? else {
          return Ok(Err(CoreError::StudentNotFound(id)));
        };
        if let Some(no) = patch.student_no {
          raw.student_no = no;
        }
        if let Some(name) = patch.name {
          raw.name = name;
        }
        raw.updated_at = now;

        match tx.execute(
          "UPDATE students SET student_no = ?1, name = ?2, updated_at = ?3 WHERE id = ?4",
          params![raw.student_no, raw.name, raw.updated_at, id],
        ) {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => {
            return Ok(Err(CoreError::DuplicateStudentNo(raw.student_no)));
          }
          Err(e) => return Err(e.into()),
        }
        tx.commit()?;
        Ok(Ok(raw))
      })
      .await?;

    outcome?.into_student()
  }

  async fn delete_student(&self, id: StudentId) -> Result<u64> {
    let outcome: Result<u64, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        if fetch_student(&tx, id)?.is_none() {
          return Ok(Err(CoreError::StudentNotFound(id)));
        }
        // The foreign key cascades too; deleting explicitly gives us a count.
        let removed =
          tx.execute("DELETE FROM score_records WHERE student_id = ?1", params![id])?;
        tx.execute("DELETE FROM students WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(Ok(removed as u64))
      })
      .await?;

    Ok(outcome?)
  }

  // ── Score records ─────────────────────────────────────────────────────────

  async fn adjust_score(
    &self,
    student_id: StudentId,
    adjustment: ScoreAdjustment,
  ) -> Result<ScoreChange> {
    let adjustment = adjustment.validated()?;
    let now = encode_dt(timestamp());

    let outcome: Result<(RawRecord, i64), CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let applied = match apply_delta(&tx, student_id, &adjustment, &now)? {
          Ok(Some(applied)) => applied,
          Ok(None) => return Ok(Err(CoreError::StudentNotFound(student_id))),
          Err(e) => return Ok(Err(e)),
        };
        tx.commit()?;
        Ok(Ok(applied))
      })
      .await?;

    let (raw, new_score) = outcome?;
    Ok(ScoreChange { record: raw.into_record()?, new_score })
  }

  async fn batch_adjust(
    &self,
    student_ids: Vec<StudentId>,
    adjustment: ScoreAdjustment,
  ) -> Result<Vec<BatchItem>> {
    validate_batch(&student_ids)?;
    let adjustment = adjustment.validated()?;
    let now = encode_dt(timestamp());

    let outcome: Result<Vec<(StudentId, Option<(RawRecord, i64)>)>, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let mut applied = Vec::with_capacity(student_ids.len());
        for id in student_ids {
          match apply_delta(&tx, id, &adjustment, &now)? {
            Ok(item) => applied.push((id, item)),
            Err(e) => return Ok(Err(e)),
          }
        }
        tx.commit()?;
        Ok(Ok(applied))
      })
      .await?;
    let applied = outcome?;

    applied
      .into_iter()
      .map(|(student_id, outcome)| -> Result<BatchItem> {
        match outcome {
          Some((raw, new_score)) => Ok(BatchItem::Applied {
            student_id,
            record: raw.into_record()?,
            new_score,
          }),
          None => {
            warn!(student_id, "batch adjustment skipped unknown student");
            Ok(BatchItem::Skipped { student_id, reason: SkipReason::StudentNotFound })
          }
        }
      })
      .collect()
  }

  async fn undo_record(&self, id: RecordId) -> Result<ScoreChange> {
    let now = encode_dt(timestamp());

    let outcome: Result<(RawRecord, i64), CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(raw) = fetch_record(&tx, id)? else {
          return Ok(Err(CoreError::RecordNotFound(id)));
        };
        let score = student_score(&tx, raw.student_id)?;
        let new_score = match unshifted_score(score, raw.value) {
          Ok(new_score) => new_score,
          Err(e) => return Ok(Err(e)),
        };
        tx.execute(
          "UPDATE students SET score = ?1, updated_at = ?2 WHERE id = ?3",
          params![new_score, now, raw.student_id],
        )?;
        tx.execute("DELETE FROM score_records WHERE id = ?1", params![id])?;
        tx.commit()?;
        Ok(Ok((raw, new_score)))
      })
      .await?;

    let (raw, new_score) = outcome?;
    Ok(ScoreChange { record: raw.into_record()?, new_score })
  }

  async fn recent_records(&self, student_id: StudentId, limit: usize) -> Result<Vec<ScoreRecord>> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM score_records
           WHERE student_id = ?1
           ORDER BY created_at DESC, id DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(params![student_id, limit], |row| RawRecord::from_row(row, 0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }

  async fn list_records(&self, query: RecordQuery) -> Result<RecordPage> {
    let RecordQuery { student_id, category, page, page_size } = query.clone();
    let offset = query.offset();

    let (total, raws): (i64, Vec<RawRecordEntry>) = self
      .conn
      .call(move |conn| {
        let filter = "(?1 IS NULL OR r.student_id = ?1) AND (?2 IS NULL OR r.category = ?2)";

        let total: i64 = conn.query_row(
          &format!("SELECT COUNT(*) FROM score_records r WHERE {filter}"),
          params![student_id, category],
          |r| r.get(0),
        )?;

        let columns = format!(
          "r.{}, s.{}",
          RECORD_COLUMNS.replace(", ", ", r."),
          STUDENT_COLUMNS.replace(", ", ", s."),
        );
        let mut stmt = conn.prepare(&format!(
          "SELECT {columns}
           FROM score_records r
           JOIN students s ON s.id = r.student_id
           WHERE {filter}
           ORDER BY r.created_at DESC, r.id DESC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(
            params![student_id, category, i64::from(page_size), offset],
            RawRecordEntry::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    let data = raws
      .into_iter()
      .map(RawRecordEntry::into_entry)
      .collect::<Result<Vec<_>>>()?;

    Ok(RecordPage { data, total, page, page_size })
  }

  async fn reset_scores(&self) -> Result<ResetSummary> {
    let now = encode_dt(timestamp());

    let summary = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let students_reset =
          tx.execute("UPDATE students SET score = 0, updated_at = ?1", params![now])?;
        let records_deleted = tx.execute("DELETE FROM score_records", [])?;
        tx.commit()?;
        Ok(ResetSummary {
          students_reset:  students_reset as u64,
          records_deleted: records_deleted as u64,
        })
      })
      .await?;

    Ok(summary)
  }

  async fn statistics(&self) -> Result<Statistics> {
    let stats = self
      .conn
      .call(|conn| {
        let total_students: i64 =
          conn.query_row("SELECT COUNT(*) FROM students", [], |r| r.get(0))?;
        let total_records: i64 =
          conn.query_row("SELECT COUNT(*) FROM score_records", [], |r| r.get(0))?;

        let mut stmt = conn.prepare(
          "SELECT category, COUNT(*), COALESCE(SUM(value), 0)
           FROM score_records
           GROUP BY category
           ORDER BY category",
        )?;
        let category_stats = stmt
          .query_map([], |row| {
            Ok(CategoryStat {
              category: row.get(0)?,
              count:    row.get(1)?,
              total:    row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Statistics { total_students, total_records, category_stats })
      })
      .await?;

    Ok(stats)
  }

  // ── Templates ─────────────────────────────────────────────────────────────

  async fn list_templates(&self) -> Result<Vec<ScoreTemplate>> {
    let templates = self
      .conn
      .call(|conn| {
        let mut stmt = conn
          .prepare(&format!("SELECT {TEMPLATE_COLUMNS} FROM score_templates ORDER BY id"))?;
        let rows = stmt
          .query_map([], template_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(templates)
  }

  async fn create_template(&self, input: NewTemplate) -> Result<ScoreTemplate> {
    let input = input.validated()?;
    let template = self
      .conn
      .call(move |conn| Ok(insert_template(conn, &input)?))
      .await?;
    Ok(template)
  }

  async fn update_template(&self, id: TemplateId, patch: TemplatePatch) -> Result<ScoreTemplate> {
    let outcome: Result<ScoreTemplate, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut template) = tx
          .query_row(
            &format!("SELECT {TEMPLATE_COLUMNS} FROM score_templates WHERE id = ?1"),
            params![id],
            template_from_row,
          )
          .optional()?
        else {
          return Ok(Err(CoreError::TemplateNotFound(id)));
        };

        patch.apply_to(&mut template);
        tx.execute(
          "UPDATE score_templates SET name = ?1, value = ?2, category = ?3 WHERE id = ?4",
          params![template.name, template.value, template.category, id],
        )?;
        tx.commit()?;
        Ok(Ok(template))
      })
      .await?;

    Ok(outcome?)
  }

  async fn delete_template(&self, id: TemplateId) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM score_templates WHERE id = ?1", params![id])?)
      })
      .await?;

    if removed == 0 {
      return Err(CoreError::TemplateNotFound(id).into());
    }
    Ok(())
  }

  // ── Rank tiers ────────────────────────────────────────────────────────────

  async fn list_ranks(&self) -> Result<Vec<RankTier>> {
    let ranks = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RANK_COLUMNS} FROM ranks ORDER BY min_score ASC, sort_order ASC, id ASC"
        ))?;
        let rows = stmt
          .query_map([], rank_from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(ranks)
  }

  async fn create_rank(&self, input: NewRankTier) -> Result<RankTier> {
    let input = input.validated()?;

    let outcome: Result<RankTier, CoreError> = self
      .conn
      .call(move |conn| match insert_rank(conn, &input) {
        Ok(tier) => Ok(Ok(tier)),
        Err(e) if is_unique_violation(&e) => {
          Ok(Err(CoreError::DuplicateThreshold(input.min_score)))
        }
        Err(e) => Err(e.into()),
      })
      .await?;

    Ok(outcome?)
  }

  async fn update_rank(&self, id: RankId, patch: RankPatch) -> Result<RankTier> {
    let outcome: Result<RankTier, CoreError> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(mut tier) = tx
          .query_row(
            &format!("SELECT {RANK_COLUMNS} FROM ranks WHERE id = ?1"),
            params![id],
            rank_from_row,
          )
          .optional()?
        else {
          return Ok(Err(CoreError::RankNotFound(id)));
        };

        if let Err(e) = patch.apply_to(&mut tier) {
          return Ok(Err(e));
        }

        match tx.execute(
          "UPDATE ranks
           SET name = ?1, min_score = ?2, color = ?3, icon = ?4, sort_order = ?5
           WHERE id = ?6",
          params![tier.name, tier.min_score, tier.color, tier.icon, tier.sort_order, id],
        ) {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => {
            return Ok(Err(CoreError::DuplicateThreshold(tier.min_score)));
          }
          Err(e) => return Err(e.into()),
        }
        tx.commit()?;
        Ok(Ok(tier))
      })
      .await?;

    Ok(outcome?)
  }

  async fn delete_rank(&self, id: RankId) -> Result<()> {
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM ranks WHERE id = ?1", params![id])?))
      .await?;

    if removed == 0 {
      return Err(CoreError::RankNotFound(id).into());
    }
    Ok(())
  }
}
