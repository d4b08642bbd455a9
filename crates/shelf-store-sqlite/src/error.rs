//! Error type for `shelf-store-sqlite`.

use shelf_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] shelf_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A write collided with a UNIQUE constraint on this column.
  #[error("{0} already exists")]
  Conflict(String),
}

impl Error {
  /// Translate UNIQUE-constraint failures into [`Error::Conflict`]; pass
  /// everything else through as [`Error::Database`].
  pub(crate) fn from_write(err: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(code, Some(msg))) = &err
      && code.code == rusqlite::ErrorCode::ConstraintViolation
      && let Some(columns) = msg.strip_prefix("UNIQUE constraint failed: ")
    {
      // "users.email" or "reviews.user_id, reviews.book_id"
      let first = columns.split(", ").next().unwrap_or(columns);
      let field = first.rsplit('.').next().unwrap_or(first);
      return Error::Conflict(field.to_owned());
    }
    Error::Database(err)
  }
}

impl StoreError for Error {
  fn conflict_field(&self) -> Option<&str> {
    match self {
      Error::Conflict(field) => Some(field),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
