//! Books: shared records created on import and rated through reviews.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::review::ReviewView;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
  pub id:             Uuid,
  pub title:          String,
  pub author:         String,
  /// Unique when present.
  pub isbn:           Option<String>,
  /// Identifier in the external catalog. Unique when present.
  pub external_id:    Option<String>,
  pub description:    String,
  pub published_date: Option<NaiveDate>,
  pub page_count:     u32,
  pub genres:         Vec<String>,
  pub cover_image:    String,
  pub language:       String,
  pub publisher:      String,
  /// Derived from reviews; see [`crate::rating::RatingSummary`].
  pub average_rating: f64,
  /// Derived from reviews.
  pub ratings_count:  u64,
  pub created_at:     DateTime<Utc>,
  pub updated_at:     DateTime<Utc>,
}

/// Book fields as supplied by a client or produced by the catalog adapter.
///
/// Carries no rating fields: those are derived and never client-writable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NewBook {
  #[serde(alias = "googleBooksId")]
  pub external_id:    Option<String>,
  #[validate(length(min = 1, message = "title is required"))]
  pub title:          String,
  #[validate(length(min = 1, message = "author is required"))]
  pub author:         String,
  pub isbn:           Option<String>,
  pub description:    String,
  pub published_date: Option<NaiveDate>,
  pub page_count:     u32,
  pub genres:         Vec<String>,
  pub cover_image:    String,
  pub language:       Option<String>,
  pub publisher:      String,
}

impl NewBook {
  /// Trim text fields and treat empty identifiers as absent, so that an
  /// empty ISBN never collides with another empty ISBN.
  pub fn normalized(mut self) -> Self {
    fn present(value: Option<String>) -> Option<String> {
      value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
    }

    self.external_id = present(self.external_id);
    self.isbn = present(self.isbn);
    self.language = present(self.language);
    self.title = self.title.trim().to_owned();
    self.author = self.author.trim().to_owned();
    self.description = self.description.trim().to_owned();
    self.publisher = self.publisher.trim().to_owned();
    self.genres = self
      .genres
      .into_iter()
      .map(|g| g.trim().to_owned())
      .filter(|g| !g.is_empty())
      .collect();
    self
  }
}

/// Compact book card embedded in review listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSummary {
  pub id:             Uuid,
  pub title:          String,
  pub author:         String,
  pub cover_image:    String,
  pub average_rating: f64,
}

/// A book page: the book and its latest public reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetail {
  pub book:    Book,
  pub reviews: Vec<ReviewView>,
}

/// Ordering for curated book listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookOrder {
  /// Most ratings first, then highest average.
  Trending,
  /// Most recently added first.
  Recent,
}

/// Combined local + external search results, returned side by side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
  pub local_books:    Vec<Book>,
  pub external_books: Vec<NewBook>,
  pub total_local:    u64,
  pub total_external: u64,
  /// Set when one of the two sources failed and results are partial.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub message:        Option<String>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalized_drops_blank_identifiers() {
    let book = NewBook {
      title: "  1984 ".into(),
      author: "Orwell".into(),
      isbn: Some("   ".into()),
      external_id: Some("".into()),
      genres: vec!["Fiction".into(), " ".into()],
      ..Default::default()
    }
    .normalized();

    assert_eq!(book.title, "1984");
    assert_eq!(book.isbn, None);
    assert_eq!(book.external_id, None);
    assert_eq!(book.genres, vec!["Fiction".to_string()]);
  }

  #[test]
  fn accepts_legacy_google_books_id() {
    let book: NewBook = serde_json::from_str(
      r#"{"googleBooksId":"abc123","title":"Dune","author":"Herbert"}"#,
    )
    .unwrap();
    assert_eq!(book.external_id.as_deref(), Some("abc123"));
  }

  #[test]
  fn title_and_author_required() {
    let errors = NewBook::default().validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("title"));
    assert!(fields.contains_key("author"));
  }
}
