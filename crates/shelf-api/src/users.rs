//! Handlers for `/users` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/users?q=&page=&limit=` | public users only |
//! | `GET`  | `/users/{username}` | private profiles are visible to their owner only |
//! | `POST` | `/users/{id}/follow` | bearer; toggles |
//! | `GET`  | `/users/{id}/followers` | |
//! | `GET`  | `/users/{id}/following` | |

use axum::{
  Json,
  extract::{Path, State},
};
use serde::Deserialize;
use shelf_core::{
  store::{BookshelfStore, FollowDirection, ReviewOrder, ReviewQuery, UserQuery},
  user::{FollowOutcome, ProfilePage, UserSummary},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
  AppState,
  auth::{AuthUser, MaybeAuthUser},
  error::ApiError,
  pagination::{PageQuery, Paginated, Window},
  validate::{ValidatedQuery, non_blank},
};

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 50;
const RECENT_REVIEWS: usize = 5;

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UserSearchQuery {
  #[validate(
    length(min = 1, max = 50, message = "q must be 1-50 characters"),
    custom(function = "non_blank", message = "q must be 1-50 characters")
  )]
  pub q:     String,
  pub page:  Option<u64>,
  pub limit: Option<u64>,
}

/// `GET /users?q=<text>`
pub async fn search<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  ValidatedQuery(query): ValidatedQuery<UserSearchQuery>,
) -> Result<Json<Paginated<UserSummary>>, ApiError> {
  let window = Window::resolve(query.page, query.limit, DEFAULT_LIMIT, MAX_LIMIT)?;

  let page = state
    .store
    .list_users(UserQuery {
      text: Some(query.q.trim().to_owned()),
      public_only: true,
      limit: window.limit(),
      offset: window.offset(),
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(window.wrap(page.map(|u| u.summary()))))
}

// ─── Profile ──────────────────────────────────────────────────────────────────

/// `GET /users/{username}`
pub async fn profile<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  viewer: MaybeAuthUser,
  Path(username): Path<String>,
) -> Result<Json<ProfilePage>, ApiError> {
  let user = state
    .store
    .get_user_by_username(username)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("user"))?;

  if !user.visible_to(viewer.id()) {
    return Err(ApiError::Forbidden("this profile is private"));
  }

  let stats = state
    .store
    .reading_stats(user.user_id)
    .await
    .map_err(ApiError::store)?;

  let recent = state
    .store
    .list_reviews(ReviewQuery {
      user_id: Some(user.user_id),
      public_only: true,
      order: ReviewOrder::NewestUpdated,
      limit: RECENT_REVIEWS,
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(ProfilePage {
    user: user.public_profile(),
    stats,
    recent_reviews: recent.items,
  }))
}

// ─── Follow ───────────────────────────────────────────────────────────────────

/// `POST /users/{id}/follow`
pub async fn follow<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(target): Path<Uuid>,
) -> Result<Json<FollowOutcome>, ApiError> {
  if target == user.user_id {
    return Err(ApiError::invalid("userId", "you cannot follow yourself"));
  }

  let outcome = state
    .store
    .toggle_follow(user.user_id, target)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("user"))?;
  Ok(Json(outcome))
}

async fn list_follows<S: BookshelfStore>(
  state: &AppState<S>,
  user_id: Uuid,
  direction: FollowDirection,
  query: &PageQuery,
) -> Result<Paginated<UserSummary>, ApiError> {
  let window = query.window(DEFAULT_LIMIT, MAX_LIMIT)?;

  state
    .store
    .get_user(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("user"))?;

  let page = state
    .store
    .list_follows(user_id, direction, window.limit(), window.offset())
    .await
    .map_err(ApiError::store)?;

  Ok(window.wrap(page.map(|u| u.summary())))
}

/// `GET /users/{id}/followers`
pub async fn followers<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  Path(user_id): Path<Uuid>,
  ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Json<Paginated<UserSummary>>, ApiError> {
  Ok(Json(list_follows(&state, user_id, FollowDirection::Followers, &query).await?))
}

/// `GET /users/{id}/following`
pub async fn following<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  Path(user_id): Path<Uuid>,
  ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Json<Paginated<UserSummary>>, ApiError> {
  Ok(Json(list_follows(&state, user_id, FollowDirection::Following, &query).await?))
}
