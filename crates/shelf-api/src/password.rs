//! Argon2id password hashing.
//!
//! Hashes are PHC strings with a random per-password salt. Hashing is CPU
//! bound, so handlers go through the `*_blocking` wrappers.

use argon2::{
  Argon2,
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use rand_core::OsRng;

use crate::error::ApiError;

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
  let salt = SaltString::generate(&mut OsRng);
  let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
  Ok(hash.to_string())
}

/// `Ok(false)` on a wrong password; `Err` only for an unparseable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
  let parsed = PasswordHash::new(hash)?;
  match Argon2::default().verify_password(password.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => Ok(false),
    Err(e) => Err(e),
  }
}

pub async fn hash_blocking(password: String) -> Result<String, ApiError> {
  tokio::task::spawn_blocking(move || hash_password(&password))
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(|e| ApiError::Internal(e.to_string()))
}

pub async fn verify_blocking(password: String, hash: String) -> Result<bool, ApiError> {
  tokio::task::spawn_blocking(move || verify_password(&password, &hash))
    .await
    .map_err(|e| ApiError::Internal(e.to_string()))?
    .map_err(|e| ApiError::Internal(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_and_verify() {
    let hash = hash_password("secret1").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password("secret1", &hash).unwrap());
    assert!(!verify_password("secret2", &hash).unwrap());
  }

  #[test]
  fn salts_differ() {
    assert_ne!(hash_password("secret1").unwrap(), hash_password("secret1").unwrap());
  }

  #[test]
  fn malformed_hash_is_an_error() {
    assert!(verify_password("secret1", "plaintext").is_err());
  }
}
