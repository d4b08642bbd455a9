//! The `BookshelfStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `shelf-store-sqlite`).
//! The API depends on this abstraction, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  book::{Book, BookOrder, NewBook},
  review::{LikeOutcome, NewReview, ReadStatus, ReviewView},
  user::{AdminStats, FollowOutcome, NewUser, ReadingStats, User, UserPatch},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Backend errors must say when a write collided with a uniqueness
/// constraint, so callers can report which field is taken.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The uniquely-constrained field the write collided on, if any.
  fn conflict_field(&self) -> Option<&str>;
}

// ─── Query types ─────────────────────────────────────────────────────────────

/// One page of results plus the total number of matches.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub total: u64,
}

impl<T> Page<T> {
  pub fn empty() -> Self { Self { items: Vec::new(), total: 0 } }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page { items: self.items.into_iter().map(f).collect(), total: self.total }
  }
}

/// Parameters for [`BookshelfStore::list_users`].
#[derive(Debug, Clone, Default)]
pub struct UserQuery {
  /// Case-insensitive substring over username and display name.
  pub text:        Option<String>,
  /// Also match `text` against email (admin listing).
  pub match_email: bool,
  /// Restrict to public profiles.
  pub public_only: bool,
  pub limit:       usize,
  pub offset:      usize,
}

/// Which side of the follow relation to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowDirection {
  /// Users following the subject.
  Followers,
  /// Users the subject follows.
  Following,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewOrder {
  #[default]
  NewestCreated,
  NewestUpdated,
}

/// Parameters for [`BookshelfStore::list_reviews`]. Filters combine with AND.
#[derive(Debug, Clone, Default)]
pub struct ReviewQuery {
  pub user_id:        Option<Uuid>,
  pub book_id:        Option<Uuid>,
  /// Restrict to reviews written by any of these users. An empty list
  /// matches nothing.
  pub authors:        Option<Vec<Uuid>>,
  pub status:         Option<ReadStatus>,
  pub public_only:    bool,
  /// Skip rating-only entries with no review text.
  pub with_text_only: bool,
  pub order:          ReviewOrder,
  pub limit:          usize,
  pub offset:         usize,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Shelf storage backend.
///
/// Operations that touch more than one record (follow toggles, review writes
/// with their rating recomputation, book import) are atomic in the backend.
///
/// All methods return `Send` futures so the trait can be used from axum
/// handlers on a multi-threaded runtime.
pub trait BookshelfStore: Clone + Send + Sync + 'static {
  type Error: StoreError;

  /// Connectivity check used by the health endpoint.
  fn ping(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Persist a new user. Fails with a conflict on `username` or `email`
  /// (case-insensitive).
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Resolve a login identifier: exact username, or email in any case.
  fn find_user_by_login(
    &self,
    login: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Apply a partial update. Returns `None` if the user does not exist.
  fn update_user(
    &self,
    id: Uuid,
    patch: UserPatch,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  /// Overwrite the stored password hash. Returns `false` if no such user.
  fn set_password_hash(
    &self,
    id: Uuid,
    password_hash: String,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Hard-delete a user together with their follow and like edges.
  /// Their reviews are kept. Returns `false` if no such user.
  fn delete_user(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Newest accounts first.
  fn list_users(
    &self,
    query: UserQuery,
  ) -> impl Future<Output = Result<Page<User>, Self::Error>> + Send + '_;

  /// Add the edge `follower → followee` if absent, remove it if present.
  /// Returns `None` if `followee` does not exist.
  fn toggle_follow(
    &self,
    follower: Uuid,
    followee: Uuid,
  ) -> impl Future<Output = Result<Option<FollowOutcome>, Self::Error>> + Send + '_;

  fn list_follows(
    &self,
    user_id: Uuid,
    direction: FollowDirection,
    limit: usize,
    offset: usize,
  ) -> impl Future<Output = Result<Page<User>, Self::Error>> + Send + '_;

  fn reading_stats(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<ReadingStats, Self::Error>> + Send + '_;

  /// Counts over all users; "new" means joined at or after `since`.
  fn admin_stats(
    &self,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<AdminStats, Self::Error>> + Send + '_;

  // ── Books ─────────────────────────────────────────────────────────────

  /// Return the book matching `input.external_id`, else `input.isbn`, else
  /// create it. The flag is `true` when a new book was created.
  fn import_book(
    &self,
    input: NewBook,
  ) -> impl Future<Output = Result<(Book, bool), Self::Error>> + Send + '_;

  fn get_book(&self, id: Uuid) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + '_;

  /// Case-insensitive match of any whitespace-separated term against title,
  /// author or description.
  fn search_books(
    &self,
    text: String,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Book>, Self::Error>> + Send + '_;

  fn list_books(
    &self,
    order: BookOrder,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Book>, Self::Error>> + Send + '_;

  /// Recompute a book's derived rating from all of its reviews.
  /// Returns `None` if the book does not exist.
  fn recompute_rating(
    &self,
    book_id: Uuid,
  ) -> impl Future<Output = Result<Option<Book>, Self::Error>> + Send + '_;

  // ── Reviews ───────────────────────────────────────────────────────────

  /// Update the caller's review of the book in place, or create it, then
  /// recompute the book's rating. Returns `None` if the book does not exist.
  fn upsert_review(
    &self,
    input: NewReview,
  ) -> impl Future<Output = Result<Option<ReviewView>, Self::Error>> + Send + '_;

  fn get_review(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ReviewView>, Self::Error>> + Send + '_;

  /// Delete a review and recompute its book's rating. Returns `false` if no
  /// such review.
  fn delete_review(&self, id: Uuid) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `None` if the review does not exist.
  fn toggle_like(
    &self,
    review_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<LikeOutcome>, Self::Error>> + Send + '_;

  fn list_reviews(
    &self,
    query: ReviewQuery,
  ) -> impl Future<Output = Result<Page<ReviewView>, Self::Error>> + Send + '_;
}
