//! Handlers for score adjustments and the record log.
//!
//! | Method   | Path                 | Notes |
//! |----------|----------------------|-------|
//! | `GET`    | `/records`           | `?page=&page_size=&student_id=&category=` |
//! | `POST`   | `/admin/score`       | One adjustment |
//! | `POST`   | `/admin/score/batch` | Same delta for many students; per-student outcome |
//! | `DELETE` | `/admin/score/{id}`  | Undo a record |

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tally_core::{
  record::{BatchItem, RecordId, RecordPage, RecordQuery, ScoreAdjustment, ScoreRecord},
  store::ScoreStore,
  student::StudentId,
};
use tracing::info;

use crate::{
  AppState,
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

// ─── Record log ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RecordParams {
  pub page:       Option<i64>,
  pub page_size:  Option<i64>,
  pub student_id: Option<StudentId>,
  pub category:   Option<String>,
}

/// `GET /records`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  ApiQuery(params): ApiQuery<RecordParams>,
) -> Result<Json<RecordPage>, ApiError>
where
  S: ScoreStore + 'static,
{
  let query =
    RecordQuery::from_raw(params.page, params.page_size, params.student_id, params.category);
  let page = state.store.list_records(query).await.map_err(ApiError::from_store)?;
  Ok(Json(page))
}

// ─── Adjustments ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AdjustBody {
  pub student_id: StudentId,
  #[serde(flatten)]
  pub adjustment: ScoreAdjustment,
}

/// A committed record plus the owning student's new score.
#[derive(Debug, Serialize)]
pub struct Adjusted {
  pub data:      ScoreRecord,
  pub new_score: i64,
}

/// `POST /admin/score` — body: `{"student_id":1,"value":2,"reason"?,"category"?}`
pub async fn adjust<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<AdjustBody>,
) -> Result<Json<Adjusted>, ApiError>
where
  S: ScoreStore + 'static,
{
  let change = state
    .store
    .adjust_score(body.student_id, body.adjustment)
    .await
    .map_err(ApiError::from_store)?;
  info!(
    student_id = body.student_id,
    value = change.record.value,
    new_score = change.new_score,
    "score adjusted"
  );
  Ok(Json(Adjusted { data: change.record, new_score: change.new_score }))
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
  pub student_ids: Vec<StudentId>,
  #[serde(flatten)]
  pub adjustment:  ScoreAdjustment,
}

#[derive(Debug, Serialize)]
pub struct BatchAdjusted {
  pub data:    Vec<BatchItem>,
  pub applied: usize,
  pub skipped: usize,
}

/// `POST /admin/score/batch` — body: `{"student_ids":[…],"value":2,…}`
pub async fn batch_adjust<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<BatchBody>,
) -> Result<Json<BatchAdjusted>, ApiError>
where
  S: ScoreStore + 'static,
{
  let items = state
    .store
    .batch_adjust(body.student_ids, body.adjustment)
    .await
    .map_err(ApiError::from_store)?;
  let applied = items.iter().filter(|i| i.is_applied()).count();
  let skipped = items.len() - applied;
  info!(applied, skipped, "batch score adjustment");
  Ok(Json(BatchAdjusted { data: items, applied, skipped }))
}

#[derive(Debug, Serialize)]
pub struct Undone {
  pub message:   &'static str,
  pub new_score: i64,
}

/// `DELETE /admin/score/{id}`
pub async fn undo<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<RecordId>,
) -> Result<Json<Undone>, ApiError>
where
  S: ScoreStore + 'static,
{
  let change = state.store.undo_record(id).await.map_err(ApiError::from_store)?;
  info!(record_id = id, student_id = change.record.student_id, "record undone");
  Ok(Json(Undone { message: "record undone", new_score: change.new_score }))
}
