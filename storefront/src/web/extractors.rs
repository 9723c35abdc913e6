// storefront/src/web/extractors.rs

//! Request-scoped identity, resolved once per request from the session token.

use actix_web::http::header;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::errors::AppError;
use crate::models::Principal;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "dairyx_session";

/// Bearer header first, then the session cookie.
fn session_token(req: &HttpRequest) -> Option<String> {
  let bearer = req
    .headers()
    .get(header::AUTHORIZATION)
    .and_then(|value| value.to_str().ok())
    .and_then(|value| value.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .map(str::to_string);
  bearer.or_else(|| {
    req
      .cookie(SESSION_COOKIE)
      .map(|c| c.value().to_string())
      .filter(|token| !token.is_empty())
  })
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
  pub principal: Principal,
  pub token: String,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let token = session_token(req);
    let app_state = req.app_data::<web::Data<AppState>>().cloned();

    Box::pin(async move {
      let app_state =
        app_state.ok_or_else(|| AppError::Internal("Application state is not configured.".to_string()))?;
      let Some(token) = token else {
        return Err(AppError::Auth("Not logged in".to_string()));
      };
      match app_state.store.resolve_session(&token).await? {
        Some(principal) => Ok(AuthenticatedUser { principal, token }),
        None => {
          warn!("Request carried an unknown or expired session token.");
          Err(AppError::Auth("Session expired or invalid".to_string()))
        }
      }
    })
  }
}

/// An authenticated session whose role is admin. No session is 401; a
/// customer session is 403.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl FromRequest for AdminUser {
  type Error = AppError;
  type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
    let authenticated = AuthenticatedUser::from_request(req, payload);
    Box::pin(async move {
      let user = authenticated.await?;
      if !user.principal.is_admin() {
        warn!(user_id = %user.principal.user_id, "Non-admin session on an admin route.");
        return Err(AppError::Forbidden("Admin access required".to_string()));
      }
      Ok(AdminUser(user))
    })
  }
}
