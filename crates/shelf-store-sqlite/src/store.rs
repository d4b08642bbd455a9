//! [`SqliteStore`]: the SQLite implementation of [`BookshelfStore`].

use std::path::Path;

use chrono::{DateTime, SubsecRound as _, Utc};
use rusqlite::{OptionalExtension as _, params, params_from_iter, types::Value};
use uuid::Uuid;

use shelf_core::{
  book::{Book, BookOrder, NewBook},
  rating::RatingSummary,
  review::{LikeOutcome, NewReview, ReadStatus, ReviewView},
  store::{BookshelfStore, FollowDirection, Page, ReviewOrder, ReviewQuery, UserQuery},
  user::{AdminStats, DEFAULT_READING_GOAL, FollowOutcome, NewUser, ReadingStats, User, UserPatch},
};

use crate::{
  Error, Result,
  encode::{
    BOOK_COLUMNS, REVIEW_VIEW_COLUMNS, REVIEW_VIEW_FROM, RawBook, RawReviewView, RawUser,
    USER_COLUMNS, encode_date, encode_dt, encode_list, encode_uuid, like_pattern,
  },
  schema::SCHEMA,
};

/// At most this many search terms are matched; the rest are ignored.
const MAX_SEARCH_TERMS: usize = 8;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Shelf store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch at most one user matching `clause`, which binds `?1` to `param`.
  async fn fetch_user(&self, clause: &'static str, param: String) -> Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE {clause}");

    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| Ok(conn.query_row(&sql, [param], RawUser::from_row).optional()?))
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}

// ─── Helpers run on the connection thread ────────────────────────────────────

fn where_clause(conds: &[&str], joiner: &str) -> String {
  if conds.is_empty() {
    String::new()
  } else {
    format!("WHERE {}", conds.join(joiner))
  }
}

/// Rewrite a book's derived rating from all of its reviews.
fn recompute_in(conn: &rusqlite::Connection, book_id: &str, now: &str) -> rusqlite::Result<bool> {
  let ratings = {
    let mut stmt = conn.prepare("SELECT rating FROM reviews WHERE book_id = ?1")?;
    stmt
      .query_map([book_id], |row| row.get::<_, u8>(0))?
      .collect::<rusqlite::Result<Vec<_>>>()?
  };

  let summary = RatingSummary::from_ratings(ratings);

  let updated = conn.execute(
    "UPDATE books SET average_rating = ?2, ratings_count = ?3, updated_at = ?4
     WHERE book_id = ?1",
    params![book_id, summary.average, summary.count as i64, now],
  )?;
  Ok(updated > 0)
}

fn select_review_view(
  conn: &rusqlite::Connection,
  review_id: &str,
) -> rusqlite::Result<Option<RawReviewView>> {
  conn
    .query_row(
      &format!("SELECT {REVIEW_VIEW_COLUMNS} {REVIEW_VIEW_FROM} WHERE r.review_id = ?1"),
      [review_id],
      RawReviewView::from_row,
    )
    .optional()
}

fn exists(conn: &rusqlite::Connection, sql: &str, id: &str) -> rusqlite::Result<bool> {
  Ok(conn.query_row(sql, [id], |_| Ok(())).optional()?.is_some())
}

// ─── BookshelfStore impl ─────────────────────────────────────────────────────

impl BookshelfStore for SqliteStore {
  type Error = Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    // Stored timestamps keep microseconds; the returned record must match.
    let now = Utc::now().trunc_subsecs(6);
    let user = User {
      user_id:         Uuid::new_v4(),
      username:        input.username,
      email:           input.email.to_lowercase(),
      password_hash:   input.password_hash,
      display_name:    input.display_name,
      bio:             String::new(),
      avatar:          String::new(),
      favorite_genres: Vec::new(),
      reading_goal:    DEFAULT_READING_GOAL,
      is_public:       true,
      is_admin:        input.is_admin,
      followers:       Vec::new(),
      following:       Vec::new(),
      joined_at:       now,
      updated_at:      now,
    };

    let id_str   = encode_uuid(user.user_id);
    let username = user.username.clone();
    let email    = user.email.clone();
    let hash     = user.password_hash.clone();
    let display  = user.display_name.clone();
    let is_admin = user.is_admin;
    let at_str   = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (
             user_id, username, email, password_hash, display_name,
             reading_goal, is_admin, created_at, updated_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
          params![id_str, username, email, hash, display, DEFAULT_READING_GOAL, is_admin, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(Error::from_write)?;

    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    self.fetch_user("u.user_id = ?1", encode_uuid(id)).await
  }

  async fn get_user_by_username(&self, username: String) -> Result<Option<User>> {
    self.fetch_user("u.username = ?1", username).await
  }

  async fn find_user_by_login(&self, login: String) -> Result<Option<User>> {
    // `email` is declared COLLATE NOCASE.
    self
      .fetch_user("u.username = ?1 OR u.email = ?1", login)
      .await
  }

  async fn update_user(&self, id: Uuid, patch: UserPatch) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let genres = patch.favorite_genres.as_deref().map(encode_list).transpose()?;
    let at_str = encode_dt(Utc::now());

    let updated = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE users SET
             username        = COALESCE(?2, username),
             email           = COALESCE(lower(?3), email),
             display_name    = COALESCE(?4, display_name),
             bio             = COALESCE(?5, bio),
             favorite_genres = COALESCE(?6, favorite_genres),
             reading_goal    = COALESCE(?7, reading_goal),
             is_public       = COALESCE(?8, is_public),
             is_admin        = COALESCE(?9, is_admin),
             updated_at      = ?10
           WHERE user_id = ?1",
          params![
            id_str,
            patch.username,
            patch.email,
            patch.display_name,
            patch.bio,
            genres,
            patch.reading_goal,
            patch.is_public,
            patch.is_admin,
            at_str,
          ],
        )?;
        Ok(n > 0)
      })
      .await
      .map_err(Error::from_write)?;

    if !updated {
      return Ok(None);
    }
    self.get_user(id).await
  }

  async fn set_password_hash(&self, id: Uuid, password_hash: String) -> Result<bool> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE users SET password_hash = ?2, updated_at = ?3 WHERE user_id = ?1",
          params![id_str, password_hash, at_str],
        )?)
      })
      .await?;
    Ok(n > 0)
  }

  async fn delete_user(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);

    let n = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM users WHERE user_id = ?1", [id_str])?))
      .await?;
    Ok(n > 0)
  }

  async fn list_users(&self, query: UserQuery) -> Result<Page<User>> {
    let mut conds: Vec<&'static str> = vec![];
    let mut args: Vec<Value> = vec![];

    if query.public_only {
      conds.push("u.is_public = 1");
    }
    if let Some(text) = query.text.as_deref().filter(|t| !t.is_empty()) {
      let pattern = like_pattern(text);
      if query.match_email {
        conds.push(
          "(u.username LIKE ? ESCAPE '\\' OR u.display_name LIKE ? ESCAPE '\\'
            OR u.email LIKE ? ESCAPE '\\')",
        );
      } else {
        conds.push("(u.username LIKE ? ESCAPE '\\' OR u.display_name LIKE ? ESCAPE '\\')");
      }
      let copies = if query.match_email { 3 } else { 2 };
      for _ in 0..copies {
        args.push(Value::Text(pattern.clone()));
      }
    }

    let where_sql = where_clause(&conds, " AND ");
    let mut page_args = args.clone();
    page_args.push(Value::Integer(query.limit as i64));
    page_args.push(Value::Integer(query.offset as i64));

    let (raws, total): (Vec<RawUser>, i64) = self
      .conn
      .call(move |conn| {
        let total = conn.query_row(
          &format!("SELECT COUNT(*) FROM users u {where_sql}"),
          params_from_iter(args),
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users u {where_sql}
           ORDER BY u.created_at DESC, u.rowid DESC
           LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt
          .query_map(params_from_iter(page_args), RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    Ok(Page {
      items: raws.into_iter().map(RawUser::into_user).collect::<Result<_>>()?,
      total: total as u64,
    })
  }

  async fn toggle_follow(&self, follower: Uuid, followee: Uuid) -> Result<Option<FollowOutcome>> {
    let follower_str = encode_uuid(follower);
    let followee_str = encode_uuid(followee);
    let at_str       = encode_dt(Utc::now());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !exists(&tx, "SELECT 1 FROM users WHERE user_id = ?1", &followee_str)? {
          return Ok(None);
        }

        let removed = tx.execute(
          "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2",
          params![follower_str, followee_str],
        )?;
        if removed == 0 {
          tx.execute(
            "INSERT INTO follows (follower_id, followee_id, created_at) VALUES (?1, ?2, ?3)",
            params![follower_str, followee_str, at_str],
          )?;
        }

        let followers_count: i64 = tx.query_row(
          "SELECT COUNT(*) FROM follows WHERE followee_id = ?1",
          [&followee_str],
          |row| row.get(0),
        )?;
        let following_count: i64 = tx.query_row(
          "SELECT COUNT(*) FROM follows WHERE follower_id = ?1",
          [&followee_str],
          |row| row.get(0),
        )?;

        tx.commit()?;

        Ok(Some(FollowOutcome {
          following:       removed == 0,
          followers_count: followers_count as u64,
          following_count: following_count as u64,
        }))
      })
      .await
      .map_err(Error::from_write)?;

    Ok(outcome)
  }

  async fn list_follows(
    &self,
    user_id:   Uuid,
    direction: FollowDirection,
    limit:     usize,
    offset:    usize,
  ) -> Result<Page<User>> {
    let id_str = encode_uuid(user_id);
    let (join_col, filter_col) = match direction {
      FollowDirection::Followers => ("follower_id", "followee_id"),
      FollowDirection::Following => ("followee_id", "follower_id"),
    };

    let (raws, total): (Vec<RawUser>, i64) = self
      .conn
      .call(move |conn| {
        let total = conn.query_row(
          &format!("SELECT COUNT(*) FROM follows e WHERE e.{filter_col} = ?1"),
          [&id_str],
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS}
           FROM follows e
           JOIN users u ON u.user_id = e.{join_col}
           WHERE e.{filter_col} = ?1
           ORDER BY e.created_at DESC
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(params![id_str, limit as i64, offset as i64], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    Ok(Page {
      items: raws.into_iter().map(RawUser::into_user).collect::<Result<_>>()?,
      total: total as u64,
    })
  }

  async fn reading_stats(&self, user_id: Uuid) -> Result<ReadingStats> {
    let id_str = encode_uuid(user_id);

    let rows: Vec<(String, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT read_status, COUNT(*) FROM reviews WHERE user_id = ?1 GROUP BY read_status",
        )?;
        let rows = stmt
          .query_map([id_str], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut stats = ReadingStats::default();
    for (status, count) in rows {
      stats.add(status.parse::<ReadStatus>()?, count as u64);
    }
    Ok(stats)
  }

  async fn admin_stats(&self, since: DateTime<Utc>) -> Result<AdminStats> {
    let since_str = encode_dt(since);

    let (total, admins, recent): (i64, i64, i64) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*),
                  COALESCE(SUM(is_admin), 0),
                  COALESCE(SUM(created_at >= ?1), 0)
           FROM users",
          [since_str],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?)
      })
      .await?;

    Ok(AdminStats {
      total_users:          total as u64,
      total_admins:         admins as u64,
      new_users_this_month: recent as u64,
      active_users:         total as u64,
    })
  }

  // ── Books ─────────────────────────────────────────────────────────────────

  async fn import_book(&self, input: NewBook) -> Result<(Book, bool)> {
    let input     = input.normalized();
    let id_str    = encode_uuid(Uuid::new_v4());
    let at_str    = encode_dt(Utc::now());
    let genres    = encode_list(&input.genres)?;
    let published = input.published_date.map(encode_date);
    let language  = input.language.clone().unwrap_or_else(|| "en".to_owned());

    let (raw, created): (RawBook, bool) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let by_id = |sql: &str, value: &str| -> rusqlite::Result<Option<String>> {
          tx.query_row(sql, [value], |row| row.get(0)).optional()
        };

        let mut existing = None;
        if let Some(external_id) = &input.external_id {
          existing = by_id("SELECT book_id FROM books WHERE external_id = ?1", external_id)?;
        }
        if existing.is_none()
          && let Some(isbn) = &input.isbn
        {
          existing = by_id("SELECT book_id FROM books WHERE isbn = ?1", isbn)?;
        }

        let created = existing.is_none();
        let book_id = match existing {
          Some(found) => found,
          None => {
            tx.execute(
              "INSERT INTO books (
                 book_id, title, author, isbn, external_id, description,
                 published_date, page_count, genres, cover_image, language,
                 publisher, created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
              params![
                id_str,
                input.title,
                input.author,
                input.isbn,
                input.external_id,
                input.description,
                published,
                input.page_count,
                genres,
                input.cover_image,
                language,
                input.publisher,
                at_str,
              ],
            )?;
            id_str
          }
        };

        let raw = tx.query_row(
          &format!("SELECT {BOOK_COLUMNS} FROM books b WHERE b.book_id = ?1"),
          [&book_id],
          RawBook::from_row,
        )?;
        tx.commit()?;
        Ok((raw, created))
      })
      .await
      .map_err(Error::from_write)?;

    Ok((raw.into_book()?, created))
  }

  async fn get_book(&self, id: Uuid) -> Result<Option<Book>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawBook> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM books b WHERE b.book_id = ?1"),
            [id_str],
            RawBook::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawBook::into_book).transpose()
  }

  async fn search_books(&self, text: String, limit: usize) -> Result<Vec<Book>> {
    let terms: Vec<String> = text
      .split_whitespace()
      .take(MAX_SEARCH_TERMS)
      .map(like_pattern)
      .collect();
    if terms.is_empty() {
      return Ok(Vec::new());
    }

    let conds: Vec<&str> = terms
      .iter()
      .map(|_| {
        "(b.title LIKE ? ESCAPE '\\' OR b.author LIKE ? ESCAPE '\\'
          OR b.description LIKE ? ESCAPE '\\')"
      })
      .collect();
    let sql = format!(
      "SELECT {BOOK_COLUMNS} FROM books b {}
       ORDER BY b.ratings_count DESC, b.created_at DESC
       LIMIT ?",
      where_clause(&conds, " OR ")
    );

    let mut args: Vec<Value> = terms
      .into_iter()
      .flat_map(|t| [Value::Text(t.clone()), Value::Text(t.clone()), Value::Text(t)])
      .collect();
    args.push(Value::Integer(limit as i64));

    let raws: Vec<RawBook> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(args), RawBook::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBook::into_book).collect()
  }

  async fn list_books(&self, order: BookOrder, limit: usize) -> Result<Vec<Book>> {
    let order_sql = match order {
      BookOrder::Trending => "b.ratings_count DESC, b.average_rating DESC, b.rowid DESC",
      BookOrder::Recent => "b.created_at DESC, b.rowid DESC",
    };

    let raws: Vec<RawBook> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BOOK_COLUMNS} FROM books b ORDER BY {order_sql} LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map([limit as i64], RawBook::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBook::into_book).collect()
  }

  async fn recompute_rating(&self, book_id: Uuid) -> Result<Option<Book>> {
    let id_str = encode_uuid(book_id);
    let at_str = encode_dt(Utc::now());

    let found = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let found = recompute_in(&tx, &id_str, &at_str)?;
        tx.commit()?;
        Ok(found)
      })
      .await?;

    if !found {
      return Ok(None);
    }
    self.get_book(book_id).await
  }

  // ── Reviews ───────────────────────────────────────────────────────────────

  async fn upsert_review(&self, input: NewReview) -> Result<Option<ReviewView>> {
    let new_id  = encode_uuid(Uuid::new_v4());
    let user_id = encode_uuid(input.user_id);
    let book_id = encode_uuid(input.book_id);
    let status  = input.read_status.as_str();
    let tags    = encode_list(&input.tags)?;
    let start   = input.start_date.map(encode_date);
    let finish  = input.finish_date.map(encode_date);
    let at_str  = encode_dt(Utc::now());

    let raw: Option<RawReviewView> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !exists(&tx, "SELECT 1 FROM books WHERE book_id = ?1", &book_id)? {
          return Ok(None);
        }

        let existing: Option<String> = tx
          .query_row(
            "SELECT review_id FROM reviews WHERE user_id = ?1 AND book_id = ?2",
            [&user_id, &book_id],
            |row| row.get(0),
          )
          .optional()?;

        let review_id = match existing {
          Some(review_id) => {
            tx.execute(
              "UPDATE reviews SET
                 rating      = ?2,
                 review_text = ?3,
                 read_status = ?4,
                 is_public   = ?5,
                 tags        = ?6,
                 start_date  = COALESCE(?7, start_date),
                 finish_date = COALESCE(?8, finish_date),
                 updated_at  = ?9
               WHERE review_id = ?1",
              params![
                review_id,
                input.rating,
                input.review_text,
                status,
                input.is_public,
                tags,
                start,
                finish,
                at_str,
              ],
            )?;
            review_id
          }
          None => {
            tx.execute(
              "INSERT INTO reviews (
                 review_id, user_id, book_id, rating, review_text, read_status,
                 is_public, tags, start_date, finish_date, created_at, updated_at
               ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)",
              params![
                new_id,
                user_id,
                book_id,
                input.rating,
                input.review_text,
                status,
                input.is_public,
                tags,
                start,
                finish,
                at_str,
              ],
            )?;
            new_id
          }
        };

        recompute_in(&tx, &book_id, &at_str)?;
        let raw = select_review_view(&tx, &review_id)?;
        tx.commit()?;
        Ok(raw)
      })
      .await
      .map_err(Error::from_write)?;

    raw.map(RawReviewView::into_view).transpose()
  }

  async fn get_review(&self, id: Uuid) -> Result<Option<ReviewView>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| Ok(select_review_view(conn, &id_str)?))
      .await?;

    raw.map(RawReviewView::into_view).transpose()
  }

  async fn delete_review(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let book_id: Option<String> = tx
          .query_row("SELECT book_id FROM reviews WHERE review_id = ?1", [&id_str], |row| {
            row.get(0)
          })
          .optional()?;
        let Some(book_id) = book_id else {
          return Ok(false);
        };

        tx.execute("DELETE FROM reviews WHERE review_id = ?1", [&id_str])?;
        recompute_in(&tx, &book_id, &at_str)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(deleted)
  }

  async fn toggle_like(&self, review_id: Uuid, user_id: Uuid) -> Result<Option<LikeOutcome>> {
    let review_str = encode_uuid(review_id);
    let user_str   = encode_uuid(user_id);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if !exists(&tx, "SELECT 1 FROM reviews WHERE review_id = ?1", &review_str)? {
          return Ok(None);
        }

        let removed = tx.execute(
          "DELETE FROM review_likes WHERE review_id = ?1 AND user_id = ?2",
          params![review_str, user_str],
        )?;
        if removed == 0 {
          tx.execute(
            "INSERT INTO review_likes (review_id, user_id) VALUES (?1, ?2)",
            params![review_str, user_str],
          )?;
        }

        let likes_count: i64 = tx.query_row(
          "SELECT COUNT(*) FROM review_likes WHERE review_id = ?1",
          [&review_str],
          |row| row.get(0),
        )?;

        tx.commit()?;
        Ok(Some(LikeOutcome { liked: removed == 0, likes_count: likes_count as u64 }))
      })
      .await
      .map_err(Error::from_write)?;

    Ok(outcome)
  }

  async fn list_reviews(&self, query: ReviewQuery) -> Result<Page<ReviewView>> {
    let mut conds: Vec<String> = vec![];
    let mut args: Vec<Value> = vec![];

    if let Some(user_id) = query.user_id {
      conds.push("r.user_id = ?".into());
      args.push(Value::Text(encode_uuid(user_id)));
    }
    if let Some(book_id) = query.book_id {
      conds.push("r.book_id = ?".into());
      args.push(Value::Text(encode_uuid(book_id)));
    }
    if let Some(authors) = &query.authors {
      if authors.is_empty() {
        return Ok(Page::empty());
      }
      let placeholders = vec!["?"; authors.len()].join(", ");
      conds.push(format!("r.user_id IN ({placeholders})"));
      args.extend(authors.iter().map(|a| Value::Text(encode_uuid(*a))));
    }
    if let Some(status) = query.status {
      conds.push("r.read_status = ?".into());
      args.push(Value::Text(status.as_str().to_owned()));
    }
    if query.public_only {
      conds.push("r.is_public = 1".into());
    }
    if query.with_text_only {
      conds.push("r.review_text != ''".into());
    }

    let conds: Vec<&str> = conds.iter().map(String::as_str).collect();
    let where_sql = where_clause(&conds, " AND ");
    let order_sql = match query.order {
      ReviewOrder::NewestCreated => "r.created_at DESC, r.rowid DESC",
      ReviewOrder::NewestUpdated => "r.updated_at DESC, r.rowid DESC",
    };

    let mut page_args = args.clone();
    page_args.push(Value::Integer(query.limit as i64));
    page_args.push(Value::Integer(query.offset as i64));

    let (raws, total): (Vec<RawReviewView>, i64) = self
      .conn
      .call(move |conn| {
        let total = conn.query_row(
          &format!("SELECT COUNT(*) FROM reviews r {where_sql}"),
          params_from_iter(args),
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {REVIEW_VIEW_COLUMNS} {REVIEW_VIEW_FROM} {where_sql}
           ORDER BY {order_sql}
           LIMIT ? OFFSET ?"
        ))?;
        let rows = stmt
          .query_map(params_from_iter(page_args), RawReviewView::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((rows, total))
      })
      .await?;

    Ok(Page {
      items: raws.into_iter().map(RawReviewView::into_view).collect::<Result<_>>()?,
      total: total as u64,
    })
  }
}
