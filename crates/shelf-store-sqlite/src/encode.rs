//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order equals chronological order. Lists are compact JSON.
//! UUIDs are hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use shelf_core::{
  book::{Book, BookSummary},
  review::{ReadStatus, Review, ReviewView},
  user::{User, UserSummary},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339_opts(SecondsFormat::Micros, true) }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_list(items: &[String]) -> Result<String> { Ok(serde_json::to_string(items)?) }

pub fn decode_list(s: &str) -> Result<Vec<String>> { Ok(serde_json::from_str(s)?) }

/// Decode a `json_group_array(...)` of UUID strings.
pub fn decode_uuid_array(s: &str) -> Result<Vec<Uuid>> {
  let raw: Vec<String> = serde_json::from_str(s)?;
  raw.iter().map(|id| decode_uuid(id)).collect()
}

/// Escape `%`, `_` and `\` and wrap in wildcards for `LIKE ... ESCAPE '\'`.
pub fn like_pattern(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 2);
  out.push('%');
  for c in text.chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}

// ─── Users ───────────────────────────────────────────────────────────────────

/// Columns read for every [`User`], followed by the two mirror sets.
pub const USER_COLUMNS: &str = "
  u.user_id, u.username, u.email, u.password_hash, u.display_name, u.bio,
  u.avatar, u.favorite_genres, u.reading_goal, u.is_public, u.is_admin,
  u.created_at, u.updated_at,
  (SELECT json_group_array(f.follower_id) FROM follows f WHERE f.followee_id = u.user_id),
  (SELECT json_group_array(f.followee_id) FROM follows f WHERE f.follower_id = u.user_id)";

pub struct RawUser {
  pub user_id:         String,
  pub username:        String,
  pub email:           String,
  pub password_hash:   String,
  pub display_name:    String,
  pub bio:             String,
  pub avatar:          String,
  pub favorite_genres: String,
  pub reading_goal:    i64,
  pub is_public:       bool,
  pub is_admin:        bool,
  pub created_at:      String,
  pub updated_at:      String,
  pub followers:       String,
  pub following:       String,
}

impl RawUser {
  /// Read a row selected with [`USER_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:         row.get(0)?,
      username:        row.get(1)?,
      email:           row.get(2)?,
      password_hash:   row.get(3)?,
      display_name:    row.get(4)?,
      bio:             row.get(5)?,
      avatar:          row.get(6)?,
      favorite_genres: row.get(7)?,
      reading_goal:    row.get(8)?,
      is_public:       row.get(9)?,
      is_admin:        row.get(10)?,
      created_at:      row.get(11)?,
      updated_at:      row.get(12)?,
      followers:       row.get(13)?,
      following:       row.get(14)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:         decode_uuid(&self.user_id)?,
      username:        self.username,
      email:           self.email,
      password_hash:   self.password_hash,
      display_name:    self.display_name,
      bio:             self.bio,
      avatar:          self.avatar,
      favorite_genres: decode_list(&self.favorite_genres)?,
      reading_goal:    u32::try_from(self.reading_goal).unwrap_or_default(),
      is_public:       self.is_public,
      is_admin:        self.is_admin,
      followers:       decode_uuid_array(&self.followers)?,
      following:       decode_uuid_array(&self.following)?,
      joined_at:       decode_dt(&self.created_at)?,
      updated_at:      decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Books ───────────────────────────────────────────────────────────────────

pub const BOOK_COLUMNS: &str = "
  b.book_id, b.title, b.author, b.isbn, b.external_id, b.description,
  b.published_date, b.page_count, b.genres, b.cover_image, b.language,
  b.publisher, b.average_rating, b.ratings_count, b.created_at, b.updated_at";

pub struct RawBook {
  pub book_id:        String,
  pub title:          String,
  pub author:         String,
  pub isbn:           Option<String>,
  pub external_id:    Option<String>,
  pub description:    String,
  pub published_date: Option<String>,
  pub page_count:     i64,
  pub genres:         String,
  pub cover_image:    String,
  pub language:       String,
  pub publisher:      String,
  pub average_rating: f64,
  pub ratings_count:  i64,
  pub created_at:     String,
  pub updated_at:     String,
}

impl RawBook {
  /// Read a row selected with [`BOOK_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      book_id:        row.get(0)?,
      title:          row.get(1)?,
      author:         row.get(2)?,
      isbn:           row.get(3)?,
      external_id:    row.get(4)?,
      description:    row.get(5)?,
      published_date: row.get(6)?,
      page_count:     row.get(7)?,
      genres:         row.get(8)?,
      cover_image:    row.get(9)?,
      language:       row.get(10)?,
      publisher:      row.get(11)?,
      average_rating: row.get(12)?,
      ratings_count:  row.get(13)?,
      created_at:     row.get(14)?,
      updated_at:     row.get(15)?,
    })
  }

  pub fn into_book(self) -> Result<Book> {
    Ok(Book {
      id:             decode_uuid(&self.book_id)?,
      title:          self.title,
      author:         self.author,
      isbn:           self.isbn,
      external_id:    self.external_id,
      description:    self.description,
      published_date: self.published_date.as_deref().map(decode_date).transpose()?,
      page_count:     u32::try_from(self.page_count).unwrap_or_default(),
      genres:         decode_list(&self.genres)?,
      cover_image:    self.cover_image,
      language:       self.language,
      publisher:      self.publisher,
      average_rating: self.average_rating,
      ratings_count:  u64::try_from(self.ratings_count).unwrap_or_default(),
      created_at:     decode_dt(&self.created_at)?,
      updated_at:     decode_dt(&self.updated_at)?,
    })
  }
}

// ─── Reviews ─────────────────────────────────────────────────────────────────

/// Review columns plus the author and book cards from LEFT JOINs on
/// `users u` and `books b`.
pub const REVIEW_VIEW_COLUMNS: &str = "
  r.review_id, r.user_id, r.book_id, r.rating, r.review_text, r.read_status,
  r.start_date, r.finish_date, r.is_public, r.tags, r.created_at, r.updated_at,
  (SELECT json_group_array(l.user_id) FROM review_likes l WHERE l.review_id = r.review_id),
  u.username, u.display_name, u.avatar, u.bio, u.created_at,
  b.title, b.author, b.cover_image, b.average_rating";

pub const REVIEW_VIEW_FROM: &str = "
  FROM reviews r
  LEFT JOIN users u ON u.user_id = r.user_id
  LEFT JOIN books b ON b.book_id = r.book_id";

pub struct RawReviewView {
  pub review_id:      String,
  pub user_id:        String,
  pub book_id:        String,
  pub rating:         i64,
  pub review_text:    String,
  pub read_status:    String,
  pub start_date:     Option<String>,
  pub finish_date:    Option<String>,
  pub is_public:      bool,
  pub tags:           String,
  pub created_at:     String,
  pub updated_at:     String,
  pub likes:          String,
  pub username:       Option<String>,
  pub display_name:   Option<String>,
  pub avatar:         Option<String>,
  pub bio:            Option<String>,
  pub joined_at:      Option<String>,
  pub title:          Option<String>,
  pub author:         Option<String>,
  pub cover_image:    Option<String>,
  pub average_rating: Option<f64>,
}

impl RawReviewView {
  /// Read a row selected with [`REVIEW_VIEW_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      review_id:      row.get(0)?,
      user_id:        row.get(1)?,
      book_id:        row.get(2)?,
      rating:         row.get(3)?,
      review_text:    row.get(4)?,
      read_status:    row.get(5)?,
      start_date:     row.get(6)?,
      finish_date:    row.get(7)?,
      is_public:      row.get(8)?,
      tags:           row.get(9)?,
      created_at:     row.get(10)?,
      updated_at:     row.get(11)?,
      likes:          row.get(12)?,
      username:       row.get(13)?,
      display_name:   row.get(14)?,
      avatar:         row.get(15)?,
      bio:            row.get(16)?,
      joined_at:      row.get(17)?,
      title:          row.get(18)?,
      author:         row.get(19)?,
      cover_image:    row.get(20)?,
      average_rating: row.get(21)?,
    })
  }

  pub fn into_view(self) -> Result<ReviewView> {
    let review = Review {
      id:          decode_uuid(&self.review_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      book_id:     decode_uuid(&self.book_id)?,
      rating:      u8::try_from(self.rating).unwrap_or_default(),
      review_text: self.review_text,
      read_status: self.read_status.parse::<ReadStatus>()?,
      start_date:  self.start_date.as_deref().map(decode_date).transpose()?,
      finish_date: self.finish_date.as_deref().map(decode_date).transpose()?,
      is_public:   self.is_public,
      likes:       decode_uuid_array(&self.likes)?,
      tags:        decode_list(&self.tags)?,
      created_at:  decode_dt(&self.created_at)?,
      updated_at:  decode_dt(&self.updated_at)?,
    };

    let user = match (self.username, self.joined_at) {
      (Some(username), Some(joined_at)) => Some(UserSummary {
        id: review.user_id,
        username,
        display_name: self.display_name.unwrap_or_default(),
        avatar: self.avatar.unwrap_or_default(),
        bio: self.bio.unwrap_or_default(),
        join_date: decode_dt(&joined_at)?,
      }),
      _ => None,
    };

    let book = self.title.map(|title| BookSummary {
      id: review.book_id,
      title,
      author: self.author.unwrap_or_default(),
      cover_image: self.cover_image.unwrap_or_default(),
      average_rating: self.average_rating.unwrap_or_default(),
    });

    Ok(ReviewView { review, user, book })
  }
}
