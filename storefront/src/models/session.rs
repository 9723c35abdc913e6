// storefront/src/models/session.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::user::UserRole;

/// The identity a request acts as, resolved from its session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Principal {
  pub user_id: Uuid,
  pub role: UserRole,
}

impl Principal {
  pub fn is_admin(&self) -> bool {
    self.role == UserRole::Admin
  }
}

#[derive(Debug, Clone, FromRow)]
pub struct Session {
  pub token: String,
  pub user_id: Uuid,
  pub role: UserRole,
  pub created_at: DateTime<Utc>,
  pub expires_at: DateTime<Utc>,
}

impl Session {
  pub fn principal(&self) -> Principal {
    Principal {
      user_id: self.user_id,
      role: self.role,
    }
  }

  pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
    self.expires_at > now
  }
}
