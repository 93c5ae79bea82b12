//! HTTP server for the Tally classroom point tracker.
//!
//! Loads [`ServerConfig`], builds the credential verifiers and mounts
//! [`tally_api::api_router`] under `/api` with request tracing.

pub mod error;

pub use error::Error;

use std::path::{Path, PathBuf};

use axum::Router;
use serde::Deserialize;
use tally_api::{
  AppState, AuthConfig,
  auth::{Argon2Credential, CredentialVerifier, SharedSecret},
};
use tally_core::{seed::RankSeed, store::ScoreStore};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `TALLY_*` environment variables. Every key is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:                String,
  pub port:                u16,
  pub store_path:          PathBuf,
  pub admin_password:      String,
  /// Argon2 PHC string; takes precedence over `admin_password`.
  pub admin_password_hash: Option<String>,
  pub reset_password:      String,
  /// Argon2 PHC string; takes precedence over `reset_password`.
  pub reset_password_hash: Option<String>,
  pub rank_seed:           RankSeed,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                "0.0.0.0".to_string(),
      port:                8080,
      store_path:          PathBuf::from("tally.db"),
      admin_password:      "admin123".to_string(),
      admin_password_hash: None,
      reset_password:      "reset123".to_string(),
      reset_password_hash: None,
      rank_seed:           RankSeed::default(),
    }
  }
}

impl ServerConfig {
  /// Read `path` (if it exists) layered under `TALLY_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, Error> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("TALLY"))
      .build()?;
    Ok(settings.try_deserialize()?)
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// Build the admin and reset verifiers, preferring hashes over plaintext.
  pub fn auth(&self) -> Result<AuthConfig, Error> {
    Ok(AuthConfig {
      admin: verifier(
        "admin_password_hash",
        self.admin_password_hash.as_deref(),
        &self.admin_password,
      )?,
      reset: verifier(
        "reset_password_hash",
        self.reset_password_hash.as_deref(),
        &self.reset_password,
      )?,
    })
  }
}

fn verifier(
  field: &'static str,
  hash: Option<&str>,
  plaintext: &str,
) -> Result<Box<dyn CredentialVerifier>, Error> {
  match hash.filter(|h| !h.trim().is_empty()) {
    Some(phc) => {
      let credential = Argon2Credential::new(phc.trim())
        .map_err(|e| Error::InvalidHash { field, message: e.to_string() })?;
      Ok(Box::new(credential))
    }
    None => Ok(Box::new(SharedSecret::new(plaintext))),
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The complete application: the API under `/api`, with every request traced.
pub fn app<S>(state: AppState<S>) -> Router
where
  S: ScoreStore + 'static,
{
  Router::new()
    .nest("/api", tally_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}
