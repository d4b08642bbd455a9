//! Extractors that deserialize and then validate, plus the custom field
//! rules shared by several request bodies.
//!
//! Malformed bodies and query strings are reported through the same
//! validation error shape as rule violations.

use axum::{
  Json,
  extract::{FromRequest, FromRequestParts, Query, Request},
  http::request::Parts,
};
use serde::de::DeserializeOwned;
use shelf_core::review::ReadStatus;
use validator::{Validate, ValidationError};

use crate::error::ApiError;

/// `Json<T>` followed by `T::validate`.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
  S: Send + Sync,
  T: DeserializeOwned + Validate,
{
  type Rejection = ApiError;

  async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
    let Json(value) = Json::<T>::from_request(req, state)
      .await
      .map_err(|rejection| ApiError::invalid("body", rejection.body_text()))?;
    value.validate()?;
    Ok(Self(value))
  }
}

/// `Query<T>` followed by `T::validate`.
pub struct ValidatedQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidatedQuery<T>
where
  S: Send + Sync,
  T: DeserializeOwned + Validate,
{
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
    let Query(value) = Query::<T>::from_request_parts(parts, state)
      .await
      .map_err(|rejection| ApiError::invalid("query", rejection.body_text()))?;
    value.validate()?;
    Ok(Self(value))
  }
}

// ─── Field rules ─────────────────────────────────────────────────────────────

/// Letters, digits and underscores only.
pub fn username_charset(username: &str) -> Result<(), ValidationError> {
  if username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
    Ok(())
  } else {
    Err(
      ValidationError::new("username_charset")
        .with_message("username may only contain letters, numbers and underscores".into()),
    )
  }
}

/// Rejects text that is empty once trimmed.
pub fn non_blank(text: &str) -> Result<(), ValidationError> {
  if text.trim().is_empty() {
    Err(ValidationError::new("non_blank").with_message("must not be blank".into()))
  } else {
    Ok(())
  }
}

pub fn valid_read_status(status: &str) -> Result<(), ValidationError> {
  status.parse::<ReadStatus>().map(|_| ()).map_err(|_| {
    ValidationError::new("read_status")
      .with_message("readStatus must be want-to-read, currently-reading or read".into())
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn username_rules() {
    assert!(username_charset("alice_01").is_ok());
    assert!(username_charset("alice!").is_err());
    assert!(username_charset("ålice").is_err());
  }

  #[test]
  fn blank_text_is_rejected() {
    assert!(non_blank(" Alice ").is_ok());
    assert!(non_blank("   ").is_err());
    assert!(non_blank("").is_err());
  }

  #[test]
  fn read_status_rules() {
    assert!(valid_read_status("currently-reading").is_ok());
    assert!(valid_read_status("finished").is_err());
  }
}
