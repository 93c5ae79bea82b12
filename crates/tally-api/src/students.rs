//! Handlers for student endpoints.
//!
//! | Method   | Path                         | Notes |
//! |----------|------------------------------|-------|
//! | `GET`    | `/students`                  | Leaderboard with rank badges |
//! | `GET`    | `/students/search?keyword=`  | 400 on a blank keyword |
//! | `GET`    | `/students/{id}`             | Detail with recent records; 404 if absent |
//! | `POST`   | `/admin/students`            | 201; 409 on a taken student number |
//! | `POST`   | `/admin/students/batch`      | 201; all or nothing |
//! | `PUT`    | `/admin/students/{id}`       | Blank fields are left unchanged |
//! | `DELETE` | `/admin/students/{id}`       | Removes the student's records too |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use tally_core::{
  Error as CoreError,
  leaderboard::{self, LeaderboardEntry, StudentDetail},
  rank::RankLadder,
  record::RECENT_RECORD_LIMIT,
  store::ScoreStore,
  student::{NewStudent, Student, StudentId, StudentPatch},
};
use tracing::info;

use crate::{
  AppState,
  envelope::{Data, data},
  error::ApiError,
  extract::{ApiJson, ApiPath, ApiQuery},
};

async fn ladder<S: ScoreStore>(store: &S) -> Result<RankLadder, ApiError> {
  let tiers = store.list_ranks().await.map_err(ApiError::from_store)?;
  Ok(RankLadder::new(tiers))
}

// ─── Public ───────────────────────────────────────────────────────────────────

/// `GET /students`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Data<Vec<LeaderboardEntry>>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let students = state.store.list_students().await.map_err(ApiError::from_store)?;
  let ladder = ladder(state.store.as_ref()).await?;
  Ok(data(leaderboard::leaderboard(students, &ladder)))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
  #[serde(default)]
  pub keyword: String,
}

/// `GET /students/search?keyword=<text>`
pub async fn search<S>(
  State(state): State<AppState<S>>,
  ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Data<Vec<Student>>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let students = state
    .store
    .search_students(&params.keyword)
    .await
    .map_err(ApiError::from_store)?;
  Ok(data(students))
}

/// `GET /students/{id}`
pub async fn detail<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<StudentId>,
) -> Result<Json<Data<StudentDetail>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let store = state.store.as_ref();
  let student = store
    .get_student(id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::from(&CoreError::StudentNotFound(id)))?;

  let records = store
    .recent_records(id, RECENT_RECORD_LIMIT)
    .await
    .map_err(ApiError::from_store)?;
  let above = store
    .count_students_above(student.score)
    .await
    .map_err(ApiError::from_store)?;
  let ladder = ladder(store).await?;

  Ok(data(StudentDetail::assemble(student, records, above, &ladder)))
}

// ─── Admin ────────────────────────────────────────────────────────────────────

/// `POST /admin/students` — body: `{"student_no":"01","name":"…"}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<NewStudent>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScoreStore + 'static,
{
  let student = state.store.create_student(body).await.map_err(ApiError::from_store)?;
  info!(id = student.id, student_no = %student.student_no, "student created");
  Ok((StatusCode::CREATED, data(student)))
}

#[derive(Debug, Deserialize)]
pub struct BatchBody {
  pub students: Vec<NewStudent>,
}

/// `POST /admin/students/batch` — body: `{"students":[…]}`
pub async fn create_batch<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<BatchBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScoreStore + 'static,
{
  if body.students.is_empty() {
    return Err(ApiError::BadRequest("students must not be empty".into()));
  }
  let students = state
    .store
    .create_students(body.students)
    .await
    .map_err(ApiError::from_store)?;
  info!(count = students.len(), "students imported");
  Ok((StatusCode::CREATED, data(students)))
}

/// `PUT /admin/students/{id}` — body: `{"student_no"?, "name"?}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<StudentId>,
  ApiJson(patch): ApiJson<StudentPatch>,
) -> Result<Json<Data<Student>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let student = state.store.update_student(id, patch).await.map_err(ApiError::from_store)?;
  info!(id, "student updated");
  Ok(data(student))
}

#[derive(Debug, Serialize)]
pub struct Deleted {
  pub message:         &'static str,
  pub records_deleted: u64,
}

/// `DELETE /admin/students/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<StudentId>,
) -> Result<Json<Deleted>, ApiError>
where
  S: ScoreStore + 'static,
{
  let records_deleted = state.store.delete_student(id).await.map_err(ApiError::from_store)?;
  info!(id, records_deleted, "student deleted");
  Ok(Json(Deleted { message: "student deleted", records_deleted }))
}
