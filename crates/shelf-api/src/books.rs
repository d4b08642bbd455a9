//! Handlers for `/books` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/books/search?q=&startIndex=&maxResults=` | local + catalog, side by side |
//! | `GET`  | `/books/trending?limit=` | most rated first |
//! | `GET`  | `/books/recent?limit=` | newest first |
//! | `GET`  | `/books/{id}` | book + latest public reviews |
//! | `POST` | `/books` | bearer; 201 when created, 200 when it already existed |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
};
use serde::Deserialize;
use shelf_core::{
  book::{Book, BookDetail, BookOrder, NewBook, SearchResults},
  store::{BookshelfStore, ReviewQuery},
};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
  AppState,
  auth::AuthUser,
  error::ApiError,
  validate::{ValidatedJson, ValidatedQuery, non_blank},
};

const LOCAL_SEARCH_LIMIT: usize = 10;
const DEFAULT_CATALOG_RESULTS: u32 = 20;
const BOOK_PAGE_REVIEWS: usize = 10;

// ─── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchQuery {
  #[validate(
    length(min = 1, max = 100, message = "q must be 1-100 characters"),
    custom(function = "non_blank", message = "q must be 1-100 characters")
  )]
  pub q:           String,
  pub start_index: u32,
  pub max_results: Option<u32>,
}

/// `GET /books/search?q=<text>`
///
/// Either source failing degrades to the other's results plus a `message`.
pub async fn search<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  ValidatedQuery(query): ValidatedQuery<SearchQuery>,
) -> Json<SearchResults> {
  let text = query.q.trim().to_owned();
  let max_results = query.max_results.unwrap_or(DEFAULT_CATALOG_RESULTS);

  let (local, external) = tokio::join!(
    state.store.search_books(text.clone(), LOCAL_SEARCH_LIMIT),
    state.catalog.search(&text, query.start_index, max_results),
  );

  let mut results = SearchResults::default();

  let local_failed = match local {
    Ok(books) => {
      results.total_local = books.len() as u64;
      results.local_books = books;
      false
    }
    Err(e) => {
      warn!(error = %e, "local book search failed");
      true
    }
  };

  let external_failed = match external {
    Ok(page) => {
      results.total_external = page.total_items;
      results.external_books = page.items;
      false
    }
    Err(e) => {
      warn!(error = %e, timeout = e.is_timeout(), "catalog search failed");
      true
    }
  };

  results.message = match (local_failed, external_failed) {
    (false, false) => None,
    (false, true) => Some("External catalog unavailable; showing local results only".into()),
    (true, false) => Some("Local search unavailable; showing catalog results only".into()),
    (true, true) => Some("Search is temporarily unavailable".into()),
  };

  Json(results)
}

// ─── Listings ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LimitQuery {
  pub limit: Option<usize>,
}

impl LimitQuery {
  fn clamped(&self) -> usize { self.limit.unwrap_or(20).clamp(1, 100) }
}

/// `GET /books/trending[?limit=<n>]`
pub async fn trending<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  ValidatedQuery(query): ValidatedQuery<LimitQuery>,
) -> Result<Json<Vec<Book>>, ApiError> {
  let books = state
    .store
    .list_books(BookOrder::Trending, query.clamped())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(books))
}

/// `GET /books/recent[?limit=<n>]`
pub async fn recent<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  ValidatedQuery(query): ValidatedQuery<LimitQuery>,
) -> Result<Json<Vec<Book>>, ApiError> {
  let books = state
    .store
    .list_books(BookOrder::Recent, query.clamped())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(books))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /books/{id}`
pub async fn get_one<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<BookDetail>, ApiError> {
  let book = state
    .store
    .get_book(id)
    .await
    .map_err(ApiError::store)?
    .ok_or(ApiError::NotFound("book"))?;

  let reviews = state
    .store
    .list_reviews(ReviewQuery {
      book_id: Some(id),
      public_only: true,
      limit: BOOK_PAGE_REVIEWS,
      ..Default::default()
    })
    .await
    .map_err(ApiError::store)?;

  Ok(Json(BookDetail { book, reviews: reviews.items }))
}

// ─── Import / create ──────────────────────────────────────────────────────────

/// `POST /books` with a [`NewBook`]; `googleBooksId` is accepted for
/// `externalId`.
pub async fn create<S: BookshelfStore>(
  State(state): State<AppState<S>>,
  AuthUser(user): AuthUser,
  ValidatedJson(body): ValidatedJson<NewBook>,
) -> Result<(StatusCode, Json<Book>), ApiError> {
  let input = body.normalized();
  input.validate()?;

  let (book, created) = state.store.import_book(input).await.map_err(ApiError::store)?;

  if created {
    info!(book_id = %book.id, title = %book.title, by = %user.user_id, "book added");
    Ok((StatusCode::CREATED, Json(book)))
  } else {
    Ok((StatusCode::OK, Json(book)))
  }
}
