//! Async HTTP client wrapping the Tally JSON API.

use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tally_core::{
  leaderboard::{LeaderboardEntry, StudentDetail},
  record::{BatchItem, RecordId, ScoreAdjustment, ScoreRecord},
  stats::Statistics,
  student::{NewStudent, Student, StudentId},
};
use tracing::debug;

/// Header carrying the admin password.
const ADMIN_HEADER: &str = "X-Admin-Password";

/// Connection settings for the Tally API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub password: String,
}

/// Async HTTP client for the Tally JSON REST API.
///
/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

#[derive(Deserialize)]
struct Data<T> {
  data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

/// Response of `POST /admin/score`.
#[derive(Debug, Deserialize)]
pub struct Adjusted {
  pub data:      ScoreRecord,
  pub new_score: i64,
}

/// Response of `POST /admin/score/batch`.
#[derive(Debug, Deserialize)]
pub struct BatchAdjusted {
  pub data:    Vec<BatchItem>,
  pub applied: usize,
  pub skipped: usize,
}

/// Response of `DELETE /admin/score/{id}`.
#[derive(Debug, Deserialize)]
pub struct Undone {
  pub new_score: i64,
}

#[derive(Serialize)]
struct AdjustBody<'a> {
  student_id: StudentId,
  #[serde(flatten)]
  adjustment: &'a ScoreAdjustment,
}

#[derive(Serialize)]
struct BatchAdjustBody<'a> {
  student_ids: &'a [StudentId],
  #[serde(flatten)]
  adjustment:  &'a ScoreAdjustment,
}

#[derive(Serialize)]
struct ImportBody<'a> {
  students: &'a [NewStudent],
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn admin(&self, req: RequestBuilder) -> Result<RequestBuilder> {
    if self.config.password.is_empty() {
      return Err(anyhow!(
        "this command needs the admin password (--password or TALLY_ADMIN_PASSWORD)"
      ));
    }
    Ok(req.header(ADMIN_HEADER, &self.config.password))
  }

  /// Send `req`, turning a non-2xx status into an error carrying the
  /// server's `{"error": …}` message.
  async fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
    debug!(request = what, "sending");
    let resp = req.send().await.with_context(|| format!("{what} failed"))?;
    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }
    let message = resp
      .json::<ErrorBody>()
      .await
      .map(|b| b.error)
      .unwrap_or_default();
    Err(anyhow!("{what} → {status}: {message}"))
  }

  async fn data<T: DeserializeOwned>(&self, req: RequestBuilder, what: &str) -> Result<T> {
    let resp = self.send(req, what).await?;
    let body: Data<T> = resp
      .json()
      .await
      .with_context(|| format!("deserialising {what} response"))?;
    Ok(body.data)
  }

  // ── Public ──────────────────────────────────────────────────────────────────

  /// `GET /api/students`
  pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>> {
    self
      .data(self.client.get(self.url("/students")), "GET /students")
      .await
  }

  /// `GET /api/students/{id}`
  pub async fn student(&self, id: StudentId) -> Result<StudentDetail> {
    let path = format!("/students/{id}");
    self.data(self.client.get(self.url(&path)), &format!("GET {path}")).await
  }

  /// `GET /api/students/search?keyword=<kw>`
  pub async fn search(&self, keyword: &str) -> Result<Vec<Student>> {
    let req = self
      .client
      .get(self.url("/students/search"))
      .query(&[("keyword", keyword)]);
    self.data(req, "GET /students/search").await
  }

  // ── Admin ───────────────────────────────────────────────────────────────────

  /// `POST /api/admin/score`
  pub async fn adjust(&self, student_id: StudentId, adjustment: &ScoreAdjustment) -> Result<Adjusted> {
    let req = self
      .admin(self.client.post(self.url("/admin/score")))?
      .json(&AdjustBody { student_id, adjustment });
    let resp = self.send(req, "POST /admin/score").await?;
    resp.json().await.context("deserialising adjustment")
  }

  /// `POST /api/admin/score/batch`
  pub async fn batch_adjust(
    &self,
    student_ids: &[StudentId],
    adjustment: &ScoreAdjustment,
  ) -> Result<BatchAdjusted> {
    let req = self
      .admin(self.client.post(self.url("/admin/score/batch")))?
      .json(&BatchAdjustBody { student_ids, adjustment });
    let resp = self.send(req, "POST /admin/score/batch").await?;
    resp.json().await.context("deserialising batch outcome")
  }

  /// `DELETE /api/admin/score/{id}`
  pub async fn undo(&self, record_id: RecordId) -> Result<Undone> {
    let path = format!("/admin/score/{record_id}");
    let req = self.admin(self.client.delete(self.url(&path)))?;
    let resp = self.send(req, &format!("DELETE {path}")).await?;
    resp.json().await.context("deserialising undo")
  }

  /// `POST /api/admin/students/batch`
  pub async fn import(&self, students: &[NewStudent]) -> Result<Vec<Student>> {
    let req = self
      .admin(self.client.post(self.url("/admin/students/batch")))?
      .json(&ImportBody { students });
    self.data(req, "POST /admin/students/batch").await
  }

  /// `GET /api/admin/statistics`
  pub async fn statistics(&self) -> Result<Statistics> {
    let req = self.admin(self.client.get(self.url("/admin/statistics")))?;
    self.data(req, "GET /admin/statistics").await
  }
}
