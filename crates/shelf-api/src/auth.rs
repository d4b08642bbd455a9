//! Bearer-token extractors.
//!
//! | Extractor | No header | Bad header / token | Valid token |
//! |-----------|-----------|--------------------|-------------|
//! | [`AuthUser`] | 401 | 401 | the user |
//! | [`MaybeAuthUser`] | anonymous | 401 | the user |
//! | [`RequireAdmin`] | 401 | 401 | the user, or 403 unless admin |
//!
//! A token whose subject no longer exists is treated as invalid.

use axum::{
  extract::FromRequestParts,
  http::{header::AUTHORIZATION, request::Parts},
};
use shelf_core::{store::BookshelfStore, user::User};

use crate::{AppState, error::ApiError};

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// A caller who may or may not be authenticated.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<User>);

/// An authenticated administrator.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

/// `Ok(None)` when there is no `Authorization` header at all.
fn bearer_token(parts: &Parts) -> Result<Option<&str>, ApiError> {
  let Some(value) = parts.headers.get(AUTHORIZATION) else {
    return Ok(None);
  };
  value
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(Some)
    .ok_or(ApiError::Unauthenticated)
}

async fn resolve<S: BookshelfStore>(token: &str, state: &AppState<S>) -> Result<User, ApiError> {
  let claims = state
    .tokens
    .verify(token)
    .map_err(|_| ApiError::Unauthenticated)?;

  state
    .store
    .get_user(claims.sub)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::Unauthenticated)
}

impl<S: BookshelfStore> FromRequestParts<AppState<S>> for AuthUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer_token(parts)?.ok_or(ApiError::Unauthenticated)?;
    Ok(AuthUser(resolve(token, state).await?))
  }
}

impl<S: BookshelfStore> FromRequestParts<AppState<S>> for MaybeAuthUser {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    match bearer_token(parts)? {
      Some(token) => Ok(MaybeAuthUser(Some(resolve(token, state).await?))),
      None => Ok(MaybeAuthUser(None)),
    }
  }
}

impl<S: BookshelfStore> FromRequestParts<AppState<S>> for RequireAdmin {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
    if !user.is_admin {
      return Err(ApiError::Forbidden("admin access required"));
    }
    Ok(RequireAdmin(user))
  }
}

impl MaybeAuthUser {
  pub fn id(&self) -> Option<uuid::Uuid> { self.0.as_ref().map(|u| u.user_id) }
}
