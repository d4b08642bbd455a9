//! Error types for `shelf-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown read status: {0:?}")]
  UnknownReadStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
