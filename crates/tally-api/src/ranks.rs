//! Handlers for rank tiers.
//!
//! | Method   | Path                 | Notes |
//! |----------|----------------------|-------|
//! | `GET`    | `/ranks`             | Ascending by threshold |
//! | `POST`   | `/admin/ranks`       | 201; 409 on a taken threshold |
//! | `PUT`    | `/admin/ranks/{id}`  | Partial update; 409 on a taken threshold |
//! | `DELETE` | `/admin/ranks/{id}`  | 404 if absent |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tally_core::{
  rank::{NewRankTier, RankId, RankPatch, RankTier},
  store::ScoreStore,
};
use tracing::info;

use crate::{
  AppState,
  envelope::{Data, Message, data, message},
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

/// `GET /ranks`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Data<Vec<RankTier>>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let ranks = state.store.list_ranks().await.map_err(ApiError::from_store)?;
  Ok(data(ranks))
}

/// `POST /admin/ranks` — body: `{"name":"…","min_score":20,"color"?,"icon"?,"sort_order"?}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<NewRankTier>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScoreStore + 'static,
{
  let tier = state.store.create_rank(body).await.map_err(ApiError::from_store)?;
  info!(id = tier.id, min_score = tier.min_score, "rank tier created");
  Ok((StatusCode::CREATED, data(tier)))
}

/// `PUT /admin/ranks/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<RankId>,
  ApiJson(patch): ApiJson<RankPatch>,
) -> Result<Json<Data<RankTier>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let tier = state.store.update_rank(id, patch).await.map_err(ApiError::from_store)?;
  info!(id, min_score = tier.min_score, "rank tier updated");
  Ok(data(tier))
}

/// `DELETE /admin/ranks/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<RankId>,
) -> Result<Json<Message>, ApiError>
where
  S: ScoreStore + 'static,
{
  state.store.delete_rank(id).await.map_err(ApiError::from_store)?;
  info!(id, "rank tier deleted");
  Ok(message("rank tier deleted"))
}
