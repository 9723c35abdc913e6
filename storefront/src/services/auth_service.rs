// storefront/src/services/auth_service.rs

//! Password hashing, session tokens and session lifecycle.

use crate::errors::AppError;
use crate::models::Principal;
use crate::store::Store;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use chrono::{Duration, Utc};
use rand_core::RngCore;
use std::fmt::Write as _;
use tracing::{debug, error, info, instrument};

pub const MIN_PASSWORD_LEN: usize = 8;
const SESSION_TOKEN_BYTES: usize = 32;

/// Hashes a plain-text password with Argon2id, returning the PHC string.
#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|argon_err| {
      error!(error = %argon_err, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing process failed: {}", argon_err))
    })
}

/// Verifies `provided_password` against a stored PHC hash.
///
/// `Ok(false)` means a mismatch; a malformed stored hash is an internal error.
#[instrument(name = "auth_service::verify_password", skip_all, err(Display))]
pub fn verify_password(hashed_password_str: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(hashed_password_str).map_err(|parse_err| {
    error!(error = %parse_err, "Failed to parse stored password hash string.");
    AppError::Internal(format!("Invalid stored password hash format: {}", parse_err))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Password verification failed: Passwords do not match.");
      Ok(false)
    }
    Err(other_argon_err) => {
      error!(error = %other_argon_err, "Argon2 password verification process encountered an error.");
      Err(AppError::Internal(format!(
        "Password verification process failed: {}",
        other_argon_err
      )))
    }
  }
}

/// 256 bits from the OS RNG, hex encoded.
pub fn generate_session_token() -> String {
  let mut bytes = [0u8; SESSION_TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  bytes.iter().fold(String::with_capacity(SESSION_TOKEN_BYTES * 2), |mut out, b| {
    let _ = write!(out, "{:02x}", b);
    out
  })
}

#[instrument(name = "auth_service::issue_session", skip(store), fields(user_id = %principal.user_id), err(Display))]
pub async fn issue_session(store: &dyn Store, principal: Principal, ttl_hours: i64) -> Result<String, AppError> {
  let token = generate_session_token();
  let expires_at = Utc::now() + Duration::hours(ttl_hours);
  store.create_session(&token, principal, expires_at).await?;
  info!(role = principal.role.as_str(), "Session issued.");
  Ok(token)
}

pub async fn end_session(store: &dyn Store, token: &str) -> Result<(), AppError> {
  store.delete_session(token).await
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("correct horse").unwrap();
    assert!(hash.starts_with("$argon2id$"));
    assert!(verify_password(&hash, "correct horse").unwrap());
    assert!(!verify_password(&hash, "wrong horse").unwrap());
    assert!(!verify_password(&hash, "").unwrap());
  }

  #[test]
  fn malformed_hash_is_internal_error() {
    assert!(matches!(verify_password("not-a-hash", "pw"), Err(AppError::Internal(_))));
  }

  #[test]
  fn session_tokens_are_hex_and_unique() {
    let a = generate_session_token();
    let b = generate_session_token();
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
  }
}
