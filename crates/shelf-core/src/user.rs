//! User accounts and the two projections served over the wire.
//!
//! [`User`] is the canonical stored record and is not
//! `Serialize`: the password hash can only leave the process through an
//! explicit projection, and neither projection carries it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::review::{ReadStatus, ReviewView};

/// Reading goal assigned to new accounts (books per year).
pub const DEFAULT_READING_GOAL: u32 = 12;

// ─── Canonical record ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
  pub user_id:         Uuid,
  pub username:        String,
  /// Always stored lowercase.
  pub email:           String,
  /// Argon2 PHC string.
  pub password_hash:   String,
  pub display_name:    String,
  pub bio:             String,
  pub avatar:          String,
  pub favorite_genres: Vec<String>,
  pub reading_goal:    u32,
  pub is_public:       bool,
  pub is_admin:        bool,
  /// Users following this user. Mirror of their `following`.
  pub followers:       Vec<Uuid>,
  /// Users this user follows. Mirror of their `followers`.
  pub following:       Vec<Uuid>,
  pub joined_at:       DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
}

/// Input for [`crate::store::BookshelfStore::create_user`].
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub email:         String,
  pub password_hash: String,
  pub display_name:  String,
  pub is_admin:      bool,
}

/// Partial update; `None` leaves the stored value untouched.
///
/// Which fields a caller may set is decided by the API layer (self-service
/// vs. admin whitelist), not here.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
  pub username:        Option<String>,
  pub email:           Option<String>,
  pub display_name:    Option<String>,
  pub bio:             Option<String>,
  pub favorite_genres: Option<Vec<String>>,
  pub reading_goal:    Option<u32>,
  pub is_public:       Option<bool>,
  pub is_admin:        Option<bool>,
}

impl UserPatch {
  pub fn is_empty(&self) -> bool {
    self.username.is_none()
      && self.email.is_none()
      && self.display_name.is_none()
      && self.bio.is_none()
      && self.favorite_genres.is_none()
      && self.reading_goal.is_none()
      && self.is_public.is_none()
      && self.is_admin.is_none()
  }
}

// ─── Projections ─────────────────────────────────────────────────────────────

/// What anyone allowed to see a profile gets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
  pub id:              Uuid,
  pub username:        String,
  pub display_name:    String,
  pub bio:             String,
  pub avatar:          String,
  pub favorite_genres: Vec<String>,
  pub reading_goal:    u32,
  pub is_public:       bool,
  pub followers:       Vec<Uuid>,
  pub following:       Vec<Uuid>,
  pub join_date:       DateTime<Utc>,
}

/// The administrator's view: public fields plus contact and account flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
  #[serde(flatten)]
  pub profile:    PublicProfile,
  pub email:      String,
  pub is_admin:   bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Compact author card embedded in review listings and user searches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
  pub id:           Uuid,
  pub username:     String,
  pub display_name: String,
  pub avatar:       String,
  pub bio:          String,
  pub join_date:    DateTime<Utc>,
}

impl User {
  pub fn public_profile(&self) -> PublicProfile {
    PublicProfile {
      id:              self.user_id,
      username:        self.username.clone(),
      display_name:    self.display_name.clone(),
      bio:             self.bio.clone(),
      avatar:          self.avatar.clone(),
      favorite_genres: self.favorite_genres.clone(),
      reading_goal:    self.reading_goal,
      is_public:       self.is_public,
      followers:       self.followers.clone(),
      following:       self.following.clone(),
      join_date:       self.joined_at,
    }
  }

  pub fn admin_profile(&self) -> AdminProfile {
    AdminProfile {
      profile:    self.public_profile(),
      email:      self.email.clone(),
      is_admin:   self.is_admin,
      created_at: self.joined_at,
      updated_at: self.updated_at,
    }
  }

  pub fn summary(&self) -> UserSummary {
    UserSummary {
      id:           self.user_id,
      username:     self.username.clone(),
      display_name: self.display_name.clone(),
      avatar:       self.avatar.clone(),
      bio:          self.bio.clone(),
      join_date:    self.joined_at,
    }
  }

  /// Whether `viewer` may see this user's profile page.
  pub fn visible_to(&self, viewer: Option<Uuid>) -> bool {
    self.is_public || viewer == Some(self.user_id)
  }
}

// ─── Aggregates ──────────────────────────────────────────────────────────────

/// Per-status review counts for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStats {
  pub read:              u64,
  pub currently_reading: u64,
  pub want_to_read:      u64,
  pub total_books:       u64,
}

impl ReadingStats {
  pub fn add(&mut self, status: ReadStatus, count: u64) {
    match status {
      ReadStatus::Read => self.read += count,
      ReadStatus::CurrentlyReading => self.currently_reading += count,
      ReadStatus::WantToRead => self.want_to_read += count,
    }
    self.total_books += count;
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
  pub total_users:          u64,
  pub total_admins:         u64,
  pub new_users_this_month: u64,
  /// No activity window is tracked; equals `total_users`.
  pub active_users:         u64,
}

/// Result of toggling a follow edge. Counts are the target's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowOutcome {
  pub following:       bool,
  pub followers_count: u64,
  pub following_count: u64,
}

// ─── Responses shared with clients ───────────────────────────────────────────

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
  pub token: String,
  pub user:  PublicProfile,
}

/// A profile page: the profile, reading stats and latest public reviews.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePage {
  pub user:           PublicProfile,
  pub stats:          ReadingStats,
  pub recent_reviews: Vec<ReviewView>,
}
