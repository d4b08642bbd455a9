//! Error type for `shelf-catalog`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("catalog request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("catalog responded with {0}")]
  Status(reqwest::StatusCode),
}

impl Error {
  /// The request gave up after the configured timeout.
  pub fn is_timeout(&self) -> bool {
    matches!(self, Error::Http(err) if err.is_timeout())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
