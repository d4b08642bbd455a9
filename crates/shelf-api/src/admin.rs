//! Handlers for `/admin` endpoints. Every handler takes [`RequireAdmin`].
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/admin/users?page=&limit=&search=` | matches username, email, display name |
//! | `GET`    | `/admin/users/{id}` | |
//! | `PUT`    | `/admin/users/{id}` | whitelisted fields only |
//! | `POST`   | `/admin/users/{id}/reset-password` | body: `{"newPassword": …}` |
//! | `DELETE` | `/admin/users/{id}` | hard delete; the user's reviews remain |
//! | `GET`    | `/admin/stats` | |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use shelf_core::{
  store::{BookshelfStore, UserQuery},
  user::{AdminProfile, AdminStats, UserPatch},
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::{
  AppState,
  accounts::clean_genres,
  auth::RequireAdmin,
  error::ApiError,
  pagination::{Paginated, Window},
  password,
  validate::{ValidatedJson, ValidatedQuery, non_blank, username_charset},
};

const DEFAULT_LIMIT: u64 = 10;
const MAX_LIMIT: u64 = 100;

/// Window for "new users this month".
const NEW_USER_WINDOW_DAYS: i64 = 30;

// ─── List / get ───────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AdminListQuery {
  pub page:   Option<u64>,
  pub limit:  Option<u64>,
  pub search: Option<String>,
}

/// `GET /admin/users`
pub async fn list<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  _admin: RequireAdmin,
  ValidatedQuery(query): ValidatedQuery<AdminListQuery>,
) -> Result<Json<Paginated<AdminProfile>>, ApiError> {
  let window = Window::resolve(query.page, query.limit, DEFAULT_LIMIT, MAX_LIMIT)?;

  let page = state
    .store
    .list_users(UserQuery {
      text: query.search.map(|s| s.trim().to_owned()),
      match_email: true,
      limit: window.limit(),
      offset: window.offset(),
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(window.wrap(page.map(|u| u.admin_profile()))))
}

/// `GET /admin/users/{id}`
pub async fn get_one<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  _admin: RequireAdmin,
  Path(id): Path<Uuid>,
) -> Result<Json<AdminProfile>, ApiError> {
  let user = state
    .store
    .get_user(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("user"))?;
  Ok(Json(user.admin_profile()))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Fields an administrator may change. Anything else is ignored.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminUpdateBody {
  #[validate(
    length(min = 3, max = 30, message = "username must be 3-30 characters"),
    custom(function = "username_charset")
  )]
  pub username:        Option<String>,
  #[validate(email(message = "email must be a valid address"))]
  pub email:           Option<String>,
  #[validate(
    length(min = 1, max = 50, message = "displayName must be 1-50 characters"),
    custom(function = "non_blank", message = "displayName must be 1-50 characters")
  )]
  pub display_name:    Option<String>,
  #[validate(length(max = 500, message = "bio must be at most 500 characters"))]
  pub bio:             Option<String>,
  #[validate(range(min = 1, max = 1000, message = "readingGoal must be between 1 and 1000"))]
  pub reading_goal:    Option<u32>,
  pub is_admin:        Option<bool>,
  pub is_public:       Option<bool>,
  pub favorite_genres: Option<Vec<String>>,
}

/// `PUT /admin/users/{id}`
pub async fn update<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  RequireAdmin(admin): RequireAdmin,
  Path(id): Path<Uuid>,
  ValidatedJson(body): ValidatedJson<AdminUpdateBody>,
) -> Result<Json<AdminProfile>, ApiError> {
  let patch = UserPatch {
    username:        body.username,
    email:           body.email.map(|e| e.trim().to_owned()),
    display_name:    body.display_name.map(|d| d.trim().to_owned()),
    bio:             body.bio,
    favorite_genres: body.favorite_genres.map(clean_genres),
    reading_goal:    body.reading_goal,
    is_public:       body.is_public,
    is_admin:        body.is_admin,
  };

  let user = state
    .store
    .update_user(id, patch)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("user"))?;

  info!(user_id = %id, by = %admin.user_id, "admin updated user");
  Ok(Json(user.admin_profile()))
}

// ─── Password reset ───────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ResetPasswordBody {
  #[serde(alias = "password")]
  #[validate(length(min = 6, message = "newPassword must be at least 6 characters"))]
  pub new_password: String,
}

/// `POST /admin/users/{id}/reset-password`
pub async fn reset_password<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  RequireAdmin(admin): RequireAdmin,
  Path(id): Path<Uuid>,
  ValidatedJson(body): ValidatedJson<ResetPasswordBody>,
) -> Result<Json<Value>, ApiError> {
  let hash = password::hash_blocking(body.new_password).await?;

  if !state.store.set_password_hash(id, hash).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound("user"));
  }

  info!(user_id = %id, by = %admin.user_id, "admin reset password");
  Ok(Json(json!({ "message": "password reset" })))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /admin/users/{id}`
pub async fn delete<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  RequireAdmin(admin): RequireAdmin,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  if !state.store.delete_user(id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound("user"));
  }

  info!(user_id = %id, by = %admin.user_id, "admin deleted user");
  Ok(StatusCode::NO_CONTENT)
}

// ─── Stats ────────────────────────────────────────────────────────────────────

/// `GET /admin/stats`
pub async fn stats<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  _admin: RequireAdmin,
) -> Result<Json<AdminStats>, ApiError> {
  let since = Utc::now() - Duration::days(NEW_USER_WINDOW_DAYS);
  let stats = state.store.admin_stats(since).await.map_err(ApiError::store)?;
  Ok(Json(stats))
}
