//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every error body carries `error` (a message) and `code` (a stable
//! machine-readable tag). Validation errors add `errors`, conflicts add
//! `field`.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shelf_core::store::StoreError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
  pub field:   String,
  pub message: String,
}

impl FieldError {
  pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
    Self { field: field.into(), message: message.into() }
  }
}

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("validation failed")]
  Validation(Vec<FieldError>),

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("authentication required")]
  Unauthenticated,

  #[error("{0}")]
  Forbidden(&'static str),

  #[error("{0} not found")]
  NotFound(&'static str),

  /// A uniquely-constrained field is already taken.
  #[error("{0} already exists")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("internal error: {0}")]
  Internal(String),
}

/// Diagnostic text of a server error. Attached to the response as an
/// extension and only copied into the body when detail exposure is on.
#[derive(Debug, Clone)]
pub struct InternalDetail(pub String);

impl ApiError {
  /// Translate a store error, surfacing uniqueness collisions as
  /// [`ApiError::Conflict`].
  pub fn store<E: StoreError>(err: E) -> Self {
    match err.conflict_field() {
      Some(field) => ApiError::Conflict(camel_case(field)),
      None => ApiError::Store(Box::new(err)),
    }
  }

  pub fn invalid(field: &str, message: impl Into<String>) -> Self {
    ApiError::Validation(vec![FieldError::new(field, message)])
  }

  pub fn code(&self) -> &'static str {
    match self {
      ApiError::Validation(_) => "VALIDATION_ERROR",
      ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
      ApiError::Unauthenticated => "UNAUTHENTICATED",
      ApiError::Forbidden(_) => "FORBIDDEN",
      ApiError::NotFound(_) => "NOT_FOUND",
      ApiError::Conflict(_) => "CONFLICT",
      ApiError::Store(_) | ApiError::Internal(_) => "INTERNAL_ERROR",
    }
  }

  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Validation(_) | ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
      ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
      ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl From<ValidationErrors> for ApiError {
  fn from(errors: ValidationErrors) -> Self {
    let mut fields: Vec<FieldError> = errors
      .field_errors()
      .into_iter()
      .flat_map(|(field, errs)| {
        let field = camel_case(&field);
        errs.iter().map(move |e| {
          let message = e
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("{field} is invalid"));
          FieldError::new(field.clone(), message)
        })
      })
      .collect();
    fields.sort_by(|a, b| a.field.cmp(&b.field));
    ApiError::Validation(fields)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let code = self.code();

    let body = match &self {
      ApiError::Validation(errors) => {
        json!({ "error": self.to_string(), "code": code, "errors": errors })
      }
      ApiError::Conflict(field) => {
        json!({ "error": self.to_string(), "code": code, "field": field })
      }
      ApiError::Store(_) | ApiError::Internal(_) => {
        tracing::error!(error = %self, "request failed");
        let mut response =
          (status, Json(json!({ "error": "server error", "code": code }))).into_response();
        response.extensions_mut().insert(InternalDetail(self.to_string()));
        return response;
      }
      _ => json!({ "error": self.to_string(), "code": code }),
    };

    (status, Json(body)).into_response()
  }
}

/// `external_id` → `externalId`.
pub(crate) fn camel_case(name: &str) -> String {
  let mut out = String::with_capacity(name.len());
  let mut upper = false;
  for c in name.chars() {
    if c == '_' {
      upper = true;
    } else if upper {
      out.extend(c.to_uppercase());
      upper = false;
    } else {
      out.push(c);
    }
  }
  out
}
