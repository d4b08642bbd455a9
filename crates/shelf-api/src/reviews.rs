//! Handlers for `/reviews` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/reviews` | bearer; create or update the caller's review of a book |
//! | `GET`    | `/reviews/user/{id}?status=&page=&limit=` | owner sees private reviews too |
//! | `GET`    | `/reviews/book/{id}?page=&limit=` | public reviews with text only |
//! | `GET`    | `/reviews/feed/following?page=&limit=` | bearer; reviews by followed users |
//! | `POST`   | `/reviews/{id}/like` | bearer; toggles |
//! | `DELETE` | `/reviews/{id}` | bearer; owner only |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use chrono::NaiveDate;
use serde::Deserialize;
use shelf_core::{
  review::{LikeOutcome, NewReview, ReadStatus, ReviewView},
  store::{BookshelfStore, ReviewOrder, ReviewQuery},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
  AppState,
  auth::{AuthUser, MaybeAuthUser},
  error::ApiError,
  pagination::{PageQuery, Paginated, Window},
  validate::{ValidatedJson, ValidatedQuery, valid_read_status},
};

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 50;

// ─── Upsert ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewBody {
  #[validate(required(message = "bookId is required"))]
  pub book_id:     Option<Uuid>,
  #[validate(
    required(message = "rating is required"),
    range(min = 1, max = 5, message = "rating must be between 1 and 5")
  )]
  pub rating:      Option<i64>,
  #[validate(
    required(message = "readStatus is required"),
    custom(function = "valid_read_status")
  )]
  pub read_status: Option<String>,
  #[validate(length(max = 2000, message = "reviewText must be at most 2000 characters"))]
  pub review_text: Option<String>,
  pub is_public:   Option<bool>,
  pub tags:        Option<Vec<String>>,
  pub start_date:  Option<NaiveDate>,
  pub finish_date: Option<NaiveDate>,
}

/// `POST /reviews`
pub async fn upsert<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  ValidatedJson(body): ValidatedJson<ReviewBody>,
) -> Result<Json<ReviewView>, ApiError> {
  // `required` has run, so the options are populated.
  let (Some(book_id), Some(rating), Some(status)) = (body.book_id, body.rating, body.read_status)
  else {
    return Err(ApiError::invalid("body", "bookId, rating and readStatus are required"));
  };
  let read_status: ReadStatus = status
    .parse()
    .map_err(|_| ApiError::invalid("readStatus", "unknown read status"))?;

  let input = NewReview {
    user_id: user.user_id,
    book_id,
    rating: rating as u8,
    review_text: body.review_text.unwrap_or_default().trim().to_owned(),
    read_status,
    is_public: body.is_public.unwrap_or(true),
    tags: body
      .tags
      .unwrap_or_default()
      .into_iter()
      .map(|t| t.trim().to_owned())
      .filter(|t| !t.is_empty())
      .collect(),
    start_date: body.start_date,
    finish_date: body.finish_date,
  };

  let view = state
    .store
    .upsert_review(input)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("book"))?;

  Ok(Json(view))
}

// ─── Listings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ByUserQuery {
  #[validate(custom(function = "valid_read_status"))]
  pub status: Option<String>,
  pub page:   Option<u64>,
  pub limit:  Option<u64>,
}

/// `GET /reviews/user/{id}`
pub async fn by_user<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  viewer: MaybeAuthUser,
  Path(user_id): Path<Uuid>,
  ValidatedQuery(query): ValidatedQuery<ByUserQuery>,
) -> Result<Json<Paginated<ReviewView>>, ApiError> {
  let window = Window::resolve(query.page, query.limit, DEFAULT_LIMIT, MAX_LIMIT)?;
  let status = query
    .status
    .as_deref()
    .map(str::parse::<ReadStatus>)
    .transpose()
    .map_err(|_| ApiError::invalid("status", "unknown read status"))?;

  state
    .store
    .get_user(user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("user"))?;

  let page = state
    .store
    .list_reviews(ReviewQuery {
      user_id: Some(user_id),
      status,
      public_only: viewer.id() != Some(user_id),
      order: ReviewOrder::NewestUpdated,
      limit: window.limit(),
      offset: window.offset(),
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(window.wrap(page)))
}

/// `GET /reviews/book/{id}`
pub async fn by_book<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  Path(book_id): Path<Uuid>,
  ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Json<Paginated<ReviewView>>, ApiError> {
  let window = query.window(DEFAULT_LIMIT, MAX_LIMIT)?;

  state
    .store
    .get_book(book_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("book"))?;

  let page = state
    .store
    .list_reviews(ReviewQuery {
      book_id: Some(book_id),
      public_only: true,
      with_text_only: true,
      limit: window.limit(),
      offset: window.offset(),
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(window.wrap(page)))
}

/// `GET /reviews/feed/following`
pub async fn feed<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  ValidatedQuery(query): ValidatedQuery<PageQuery>,
) -> Result<Json<Paginated<ReviewView>>, ApiError> {
  let window = query.window(DEFAULT_LIMIT, MAX_LIMIT)?;

  let page = state
    .store
    .list_reviews(ReviewQuery {
      authors: Some(user.following),
      public_only: true,
      limit: window.limit(),
      offset: window.offset(),
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(window.wrap(page)))
}

// ─── Like ─────────────────────────────────────────────────────────────────────

/// `POST /reviews/{id}/like`
pub async fn like<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(review_id): Path<Uuid>,
) -> Result<Json<LikeOutcome>, ApiError> {
  let outcome = state
    .store
    .toggle_like(review_id, user.user_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("review"))?;
  Ok(Json(outcome))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /reviews/{id}`
pub async fn delete<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  Path(review_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  let view = state
    .store
    .get_review(review_id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("review"))?;

  if view.review.user_id != user.user_id {
    return Err(ApiError::Forbidden("only the author may delete a review"));
  }

  if !state.store.delete_review(review_id).await.map_err(ApiError::store)? {
    return Err(ApiError::NotFound("review"));
  }
  Ok(StatusCode::NO_CONTENT)
}
