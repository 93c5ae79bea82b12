//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by any [`tally_core::store::ScoreStore`].
//! Everything under `/admin` except the two credential checks requires the
//! `X-Admin-Password` header. TLS and transport concerns are the caller's
//! responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(state))
//! ```

pub mod admin;
pub mod auth;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod ranks;
pub mod scores;
pub mod students;
pub mod templates;

use std::sync::Arc;

use axum::{
  Router,
  middleware,
  routing::{delete, get, post, put},
};
use tally_core::store::ScoreStore;

pub use auth::AuthConfig;
pub use error::ApiError;

/// Shared state threaded through all handlers.
pub struct AppState<S> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: S, auth: AuthConfig) -> Self {
    Self { store: Arc::new(store), auth: Arc::new(auth) }
  }
}

// Manual impl: `S` itself need not be `Clone`.
impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), auth: Arc::clone(&self.auth) }
  }
}

/// Build a fully-materialised API router.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: ScoreStore + 'static,
{
  let admin = Router::new()
    // Students
    .route("/students", post(students::create::<S>))
    .route("/students/batch", post(students::create_batch::<S>))
    .route("/students/{id}", put(students::update::<S>).delete(students::delete::<S>))
    // Scores
    .route("/score", post(scores::adjust::<S>))
    .route("/score/batch", post(scores::batch_adjust::<S>))
    .route("/score/{id}", delete(scores::undo::<S>))
    // Templates
    .route("/templates", post(templates::create::<S>))
    .route("/templates/{id}", put(templates::update::<S>).delete(templates::delete::<S>))
    // Ranks
    .route("/ranks", post(ranks::create::<S>))
    .route("/ranks/{id}", put(ranks::update::<S>).delete(ranks::delete::<S>))
    // Whole store
    .route("/reset", post(admin::reset::<S>))
    .route("/statistics", get(admin::statistics::<S>))
    // Everything above this line is gated.
    .route_layer(middleware::from_fn_with_state(state.clone(), auth::require_admin::<S>))
    .route("/login", post(admin::login::<S>))
    .route("/verify-reset", post(admin::verify_reset::<S>));

  Router::new()
    .route("/students", get(students::list::<S>))
    .route("/students/search", get(students::search::<S>))
    .route("/students/{id}", get(students::detail::<S>))
    .route("/ranks", get(ranks::list::<S>))
    .route("/templates", get(templates::list::<S>))
    .route("/records", get(scores::list::<S>))
    .nest("/admin", admin)
    .with_state(state)
}
