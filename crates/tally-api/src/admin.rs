//! Credential checks and whole-store admin operations.
//!
//! `/admin/login` and `/admin/verify-reset` are not behind the admin
//! middleware; they exist so a client can check a password before using it.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tally_core::{record::ResetSummary, stats::Statistics, store::ScoreStore};
use tracing::{info, warn};

use crate::{
  AppState,
  auth::CredentialVerifier,
  envelope::{Data, Message, data, message},
  error::ApiError,
  extract::ApiJson,
};

#[derive(Debug, Deserialize)]
pub struct CredentialBody {
  #[serde(default)]
  pub password: Option<String>,
}

fn check(body: CredentialBody, verifier: &dyn CredentialVerifier) -> Result<(), ApiError> {
  let password = body
    .password
    .filter(|p| !p.is_empty())
    .ok_or_else(|| ApiError::BadRequest("password is required".into()))?;
  if verifier.verify(&password) {
    Ok(())
  } else {
    Err(ApiError::Unauthorized)
  }
}

/// `POST /admin/login` — body: `{"password":"…"}`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<CredentialBody>,
) -> Result<Json<Message>, ApiError>
where
  S: ScoreStore + 'static,
{
  check(body, state.auth.admin.as_ref()).inspect_err(|e| {
    if matches!(e, ApiError::Unauthorized) {
      warn!("admin login rejected");
    }
  })?;
  Ok(message("login successful"))
}

/// `POST /admin/verify-reset` — body: `{"password":"…"}`
pub async fn verify_reset<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<CredentialBody>,
) -> Result<Json<Message>, ApiError>
where
  S: ScoreStore + 'static,
{
  check(body, state.auth.reset.as_ref()).inspect_err(|e| {
    if matches!(e, ApiError::Unauthorized) {
      warn!("reset password rejected");
    }
  })?;
  Ok(message("reset password verified"))
}

#[derive(Debug, Serialize)]
pub struct ResetDone {
  pub message: &'static str,
  pub data:    ResetSummary,
}

/// `POST /admin/reset` — zero every score and delete every record.
pub async fn reset<S>(State(state): State<AppState<S>>) -> Result<Json<ResetDone>, ApiError>
where
  S: ScoreStore + 'static,
{
  let summary = state.store.reset_scores().await.map_err(ApiError::from_store)?;
  info!(
    students_reset = summary.students_reset,
    records_deleted = summary.records_deleted,
    "all scores reset"
  );
  Ok(Json(ResetDone { message: "all scores reset", data: summary }))
}

/// `GET /admin/statistics`
pub async fn statistics<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Data<Statistics>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let stats = state.store.statistics().await.map_err(ApiError::from_store)?;
  Ok(data(stats))
}
