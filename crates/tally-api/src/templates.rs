//! Handlers for score templates.
//!
//! | Method   | Path                     | Notes |
//! |----------|--------------------------|-------|
//! | `GET`    | `/templates`             | |
//! | `POST`   | `/admin/templates`       | 201 |
//! | `PUT`    | `/admin/templates/{id}`  | Partial update |
//! | `DELETE` | `/admin/templates/{id}`  | 404 if absent |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tally_core::{
  store::ScoreStore,
  template::{NewTemplate, ScoreTemplate, TemplateId, TemplatePatch},
};
use tracing::info;

use crate::{
  AppState,
  envelope::{Data, Message, data, message},
  error::ApiError,
  extract::{ApiJson, ApiPath},
};

/// `GET /templates`
pub async fn list<S>(
  State(state): State<AppState<S>>,
) -> Result<Json<Data<Vec<ScoreTemplate>>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let templates = state.store.list_templates().await.map_err(ApiError::from_store)?;
  Ok(data(templates))
}

/// `POST /admin/templates` — body: `{"name":"…","value":2,"category"?}`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  ApiJson(body): ApiJson<NewTemplate>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ScoreStore + 'static,
{
  let template = state.store.create_template(body).await.map_err(ApiError::from_store)?;
  info!(id = template.id, name = %template.name, "template created");
  Ok((StatusCode::CREATED, data(template)))
}

/// `PUT /admin/templates/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<TemplateId>,
  ApiJson(patch): ApiJson<TemplatePatch>,
) -> Result<Json<Data<ScoreTemplate>>, ApiError>
where
  S: ScoreStore + 'static,
{
  let template = state.store.update_template(id, patch).await.map_err(ApiError::from_store)?;
  info!(id, "template updated");
  Ok(data(template))
}

/// `DELETE /admin/templates/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  ApiPath(id): ApiPath<TemplateId>,
) -> Result<Json<Message>, ApiError>
where
  S: ScoreStore + 'static,
{
  state.store.delete_template(id).await.map_err(ApiError::from_store)?;
  info!(id, "template deleted");
  Ok(message("template deleted"))
}
