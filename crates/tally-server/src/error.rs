//! Startup errors for the server crate.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  /// A configured `*_password_hash` is not a valid argon2 PHC string.
  #[error("invalid {field}: {message}")]
  InvalidHash {
    field:   &'static str,
    message: String,
  },
}
