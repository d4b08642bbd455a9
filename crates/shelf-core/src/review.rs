//! Reviews: one reading record per (user, book).

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, book::BookSummary, user::UserSummary};

/// Reading status. Any state may move to any other through an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadStatus {
  WantToRead,
  CurrentlyReading,
  Read,
}

impl ReadStatus {
  pub const ALL: [ReadStatus; 3] =
    [ReadStatus::WantToRead, ReadStatus::CurrentlyReading, ReadStatus::Read];

  pub fn as_str(self) -> &'static str {
    match self {
      ReadStatus::WantToRead => "want-to-read",
      ReadStatus::CurrentlyReading => "currently-reading",
      ReadStatus::Read => "read",
    }
  }
}

impl fmt::Display for ReadStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for ReadStatus {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ReadStatus::ALL
      .into_iter()
      .find(|status| status.as_str() == s)
      .ok_or_else(|| Error::UnknownReadStatus(s.to_owned()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub id:          Uuid,
  pub user_id:     Uuid,
  pub book_id:     Uuid,
  /// 1 through 5.
  pub rating:      u8,
  pub review_text: String,
  pub read_status: ReadStatus,
  pub start_date:  Option<NaiveDate>,
  pub finish_date: Option<NaiveDate>,
  pub is_public:   bool,
  pub likes:       Vec<Uuid>,
  pub tags:        Vec<String>,
  pub created_at:  DateTime<Utc>,
  pub updated_at:  DateTime<Utc>,
}

/// Input for [`crate::store::BookshelfStore::upsert_review`].
///
/// On update, `start_date` / `finish_date` of `None` keep the stored value.
#[derive(Debug, Clone)]
pub struct NewReview {
  pub user_id:     Uuid,
  pub book_id:     Uuid,
  pub rating:      u8,
  pub review_text: String,
  pub read_status: ReadStatus,
  pub is_public:   bool,
  pub tags:        Vec<String>,
  pub start_date:  Option<NaiveDate>,
  pub finish_date: Option<NaiveDate>,
}

/// A review together with its author and book cards.
///
/// Either card is `None` when the referenced record no longer exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewView {
  #[serde(flatten)]
  pub review: Review,
  pub user:   Option<UserSummary>,
  pub book:   Option<BookSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeOutcome {
  pub liked:       bool,
  pub likes_count: u64,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn read_status_round_trips_through_text() {
    for status in ReadStatus::ALL {
      assert_eq!(status.as_str().parse::<ReadStatus>().unwrap(), status);
      assert_eq!(
        serde_json::to_value(status).unwrap(),
        serde_json::Value::String(status.to_string())
      );
    }
  }

  #[test]
  fn unknown_status_is_rejected() {
    assert!(matches!(
      "finished".parse::<ReadStatus>(),
      Err(Error::UnknownReadStatus(s)) if s == "finished"
    ));
  }
}
