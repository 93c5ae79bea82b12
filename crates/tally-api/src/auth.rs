//! Admin credentials and the middleware guarding `/admin` routes.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::Response,
};
use sha2::{Digest, Sha256};
use tally_core::store::ScoreStore;
use tracing::warn;

use crate::{AppState, error::ApiError};

/// Header carrying the admin password on every gated request.
pub const ADMIN_HEADER: &str = "x-admin-password";

/// Checks a presented password against one configured credential.
pub trait CredentialVerifier: Send + Sync {
  fn verify(&self, presented: &str) -> bool;
}

/// A plaintext secret from configuration.
///
/// Only the SHA-256 digest is kept; both sides are hashed before comparing so
/// the comparison runs over equal-length inputs.
pub struct SharedSecret {
  digest: [u8; 32],
}

impl SharedSecret {
  pub fn new(secret: &str) -> Self {
    Self { digest: Sha256::digest(secret.as_bytes()).into() }
  }
}

impl CredentialVerifier for SharedSecret {
  fn verify(&self, presented: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    self
      .digest
      .iter()
      .zip(presented.iter())
      .fold(0u8, |acc, (a, b)| acc | (a ^ b))
      == 0
  }
}

/// An argon2 PHC string, e.g. `$argon2id$v=19$…`.
pub struct Argon2Credential {
  phc: String,
}

impl Argon2Credential {
  /// Fails if `phc` is not a parseable PHC string.
  pub fn new(phc: impl Into<String>) -> Result<Self, argon2::password_hash::Error> {
    let phc = phc.into();
    PasswordHash::new(&phc)?;
    Ok(Self { phc })
  }
}

impl CredentialVerifier for Argon2Credential {
  fn verify(&self, presented: &str) -> bool {
    let Ok(hash) = PasswordHash::new(&self.phc) else {
      return false;
    };
    Argon2::default()
      .verify_password(presented.as_bytes(), &hash)
      .is_ok()
  }
}

/// The two process-wide credentials.
pub struct AuthConfig {
  /// Gates every `/admin` mutation and `/admin/login`.
  pub admin: Box<dyn CredentialVerifier>,
  /// Checked by `/admin/verify-reset` before a client offers a full reset.
  pub reset: Box<dyn CredentialVerifier>,
}

impl AuthConfig {
  /// Both credentials as plaintext secrets.
  pub fn shared(admin: &str, reset: &str) -> Self {
    Self {
      admin: Box::new(SharedSecret::new(admin)),
      reset: Box::new(SharedSecret::new(reset)),
    }
  }
}

/// Verify the admin header directly from request headers.
pub fn verify_admin(headers: &HeaderMap, config: &AuthConfig) -> Result<(), ApiError> {
  let presented = headers
    .get(ADMIN_HEADER)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  if !config.admin.verify(presented) {
    warn!("rejected admin password");
    return Err(ApiError::Unauthorized);
  }
  Ok(())
}

/// Middleware: reject the request with 401 unless the admin header verifies.
/// Runs before the handler, so no body is parsed and no store call is made.
pub async fn require_admin<S>(
  State(state): State<AppState<S>>,
  req: Request,
  next: Next,
) -> Result<Response, ApiError>
where
  S: ScoreStore + 'static,
{
  verify_admin(req.headers(), &state.auth)?;
  Ok(next.run(req).await)
}
