//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user's id and username. There is no
//! server-side session: a token is valid until it expires.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shelf_core::user::User;
use uuid::Uuid;

pub const DEFAULT_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub:      Uuid,
  pub username: String,
  pub iat:      i64,
  pub exp:      i64,
}

/// Signing secret and token lifetime.
#[derive(Clone)]
pub struct TokenConfig {
  secret: String,
  ttl:    Duration,
}

impl std::fmt::Debug for TokenConfig {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("TokenConfig").field("ttl", &self.ttl).finish_non_exhaustive()
  }
}

impl TokenConfig {
  pub fn new(secret: impl Into<String>, ttl_days: i64) -> Self {
    Self { secret: secret.into(), ttl: Duration::days(ttl_days) }
  }

  pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
      sub:      user.user_id,
      username: user.username.clone(),
      iat:      now.timestamp(),
      exp:      (now + self.ttl).timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
  }

  /// Check signature and expiry and return the claims.
  pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
      token,
      &DecodingKey::from_secret(self.secret.as_bytes()),
      &Validation::default(),
    )?;
    Ok(data.claims)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn user() -> User {
    let now = Utc::now();
    User {
      user_id:         Uuid::new_v4(),
      username:        "alice".into(),
      email:           "alice@example.com".into(),
      password_hash:   String::new(),
      display_name:    "Alice".into(),
      bio:             String::new(),
      avatar:          String::new(),
      favorite_genres: vec![],
      reading_goal:    12,
      is_public:       true,
      is_admin:        false,
      followers:       vec![],
      following:       vec![],
      joined_at:       now,
      updated_at:      now,
    }
  }

  #[test]
  fn issued_token_verifies() {
    let config = TokenConfig::new("test-secret", DEFAULT_TTL_DAYS);
    let alice = user();
    let claims = config.verify(&config.issue(&alice).unwrap()).unwrap();

    assert_eq!(claims.sub, alice.user_id);
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.exp - claims.iat, 7 * 24 * 60 * 60);
  }

  #[test]
  fn other_secret_is_rejected() {
    let token = TokenConfig::new("secret-a", 7).issue(&user()).unwrap();
    assert!(TokenConfig::new("secret-b", 7).verify(&token).is_err());
  }

  #[test]
  fn expired_token_is_rejected() {
    // Well past the default 60 s leeway.
    let config = TokenConfig::new("test-secret", -1);
    let token = config.issue(&user()).unwrap();
    assert!(config.verify(&token).is_err());
  }

  #[test]
  fn garbage_is_rejected() {
    let config = TokenConfig::new("test-secret", 7);
    assert!(config.verify("not.a.jwt").is_err());
  }
}
