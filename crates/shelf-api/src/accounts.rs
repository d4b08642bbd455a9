//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/register` | 201 with `{token, user}` |
//! | `POST` | `/auth/login` | `login` is a username or an email |
//! | `GET`  | `/auth/me` | bearer required |
//! | `PUT`  | `/auth/profile` | bearer required; unknown fields ignored |

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use shelf_core::{
  store::BookshelfStore,
  user::{NewUser, PublicProfile, Session, User, UserPatch},
};
use tracing::info;
use validator::Validate;

use crate::{
  AppState,
  auth::AuthUser,
  error::ApiError,
  password,
  validate::{ValidatedJson, non_blank, username_charset},
};

fn session<S>(state: &AppState<S>, user: &User) -> Result<Session, ApiError> {
  let token = state
    .tokens
    .issue(user)
    .map_err(|e| ApiError::Internal(e.to_string()))?;
  Ok(Session { token, user: user.public_profile() })
}

// ─── Register ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct RegisterBody {
  #[validate(
    length(min = 3, max = 30, message = "username must be 3-30 characters"),
    custom(function = "username_charset")
  )]
  pub username:     String,
  #[validate(email(message = "email must be a valid address"))]
  pub email:        String,
  #[validate(length(min = 6, message = "password must be at least 6 characters"))]
  pub password:     String,
  #[validate(
    length(min = 1, max = 50, message = "displayName must be 1-50 characters"),
    custom(function = "non_blank", message = "displayName must be 1-50 characters")
  )]
  pub display_name: String,
}

/// `POST /auth/register`
pub async fn register<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  ValidatedJson(body): ValidatedJson<RegisterBody>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
  let password_hash = password::hash_blocking(body.password).await?;

  let user = state
    .store
    .create_user(NewUser {
      username: body.username,
      email: body.email.trim().to_owned(),
      password_hash,
      display_name: body.display_name.trim().to_owned(),
      is_admin: false,
    })
    .await
    .map_err(ApiError::store)?;

  info!(user_id = %user.user_id, username = %user.username, "registered");
  Ok((StatusCode::CREATED, Json(session(&state, &user)?)))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginBody {
  /// Username, or email in any case.
  #[serde(alias = "email", alias = "username")]
  #[validate(length(min = 1, message = "login is required"))]
  pub login:    String,
  #[validate(length(min = 1, message = "password is required"))]
  pub password: String,
}

/// `POST /auth/login`
pub async fn login<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  ValidatedJson(body): ValidatedJson<LoginBody>,
) -> Result<Json<Session>, ApiError> {
  let user = state
    .store
    .find_user_by_login(body.login.trim().to_owned())
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::InvalidCredentials)?;

  if !password::verify_blocking(body.password, user.password_hash.clone()).await? {
    return Err(ApiError::InvalidCredentials);
  }

  Ok(Json(session(&state, &user)?))
}

// ─── Me ───────────────────────────────────────────────────────────────────────

/// `GET /auth/me`
pub async fn me(AuthUser(user): AuthUser) -> Json<PublicProfile> { Json(user.public_profile()) }

// ─── Profile update ───────────────────────────────────────────────────────────

/// Self-service fields. Anything else in the body is ignored.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileBody {
  #[validate(
    length(min = 1, max = 50, message = "displayName must be 1-50 characters"),
    custom(function = "non_blank", message = "displayName must be 1-50 characters")
  )]
  pub display_name:    Option<String>,
  #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
  pub bio:             Option<String>,
  #[validate(range(min = 1, max = 1000, message = "readingGoal must be between 1 and 1000"))]
  pub reading_goal:    Option<u32>,
  pub is_public:       Option<bool>,
  pub favorite_genres: Option<Vec<String>>,
}

pub(crate) fn clean_genres(genres: Vec<String>) -> Vec<String> {
  genres
    .into_iter()
    .map(|g| g.trim().to_owned())
    .filter(|g| !g.is_empty())
    .collect()
}

/// `PUT /auth/profile`
pub async fn update_profile<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  ValidatedJson(body): ValidatedJson<ProfileBody>,
) -> Result<Json<PublicProfile>, ApiError> {
  let patch = UserPatch {
    display_name: body.display_name.map(|d| d.trim().to_owned()),
    bio: body.bio,
    reading_goal: body.reading_goal,
    is_public: body.is_public,
    favorite_genres: body.favorite_genres.map(clean_genres),
    ..Default::default()
  };

  let updated = state
    .store
    .update_user(user.user_id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("user"))?;

  Ok(Json(updated.public_profile()))
}
