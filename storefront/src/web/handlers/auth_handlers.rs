// storefront/src/web/handlers/auth_handlers.rs

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse, HttpResponseBuilder};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use super::run_to_completion;
use crate::errors::AppError;
use crate::models::User;
use crate::pipelines::contexts::{SigninAudience, SigninCtxData, SignupCtxData};
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::extractors::{AuthenticatedUser, SESSION_COOKIE};
use crate::workflow::ContextData;

// --- Request DTOs ---
#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct RegisterRequestPayload {
  pub fullname: String,
  pub email: String,
  pub phone: Option<String>,
  pub password: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct LoginRequestPayload {
  pub email: String,
  pub password: String,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
pub struct AdminLoginRequestPayload {
  #[serde(alias = "email")]
  pub username: String,
  pub password: String,
}

fn user_json(user: &User) -> serde_json::Value {
  json!({
    "id": user.id,
    "email": user.email,
    "fullname": user.fullname,
    "role": user.role,
  })
}

fn session_cookie(token: &str, ttl_hours: i64) -> Cookie<'static> {
  Cookie::build(SESSION_COOKIE, token.to_string())
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .max_age(CookieDuration::hours(ttl_hours))
    .finish()
}

/// Success body plus the session cookie; the token is also returned for
/// clients that send it as a bearer header.
fn session_response(
  mut builder: HttpResponseBuilder,
  app_state: &AppState,
  message: &str,
  user: &User,
  token: &str,
) -> HttpResponse {
  builder
    .cookie(session_cookie(token, app_state.config.session_ttl_hours))
    .json(json!({
      "success": true,
      "message": message,
      "user": user_json(user),
      "token": token,
    }))
}

#[instrument(name = "handler::register", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<RegisterRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  let ctx = ContextData::new(SignupCtxData {
    app_state: app_state.get_ref().clone(),
    fullname: payload.fullname,
    email: payload.email,
    phone: payload.phone,
    password: payload.password,
    created_user: None,
    session_token: None,
  });

  run_to_completion(&app_state, &ctx, "Registration").await?;

  let guard = ctx.read();
  let (user, token) = match (&guard.created_user, &guard.session_token) {
    (Some(user), Some(token)) => (user, token),
    _ => {
      warn!("Signup pipeline completed without a user or session.");
      return Err(AppError::Internal("Registration completed without a session.".to_string()));
    }
  };
  info!(user_id = %user.id, "Registration successful.");
  Ok(session_response(
    HttpResponse::Created(),
    &app_state,
    "Registration successful",
    user,
    token,
  ))
}

async fn sign_in(
  app_state: &web::Data<AppState>,
  audience: SigninAudience,
  identifier: String,
  password: String,
) -> Result<HttpResponse, AppError> {
  let ctx = ContextData::new(SigninCtxData {
    app_state: app_state.get_ref().clone(),
    audience,
    identifier,
    password,
    resolved_email: None,
    user: None,
    session_token: None,
  });

  run_to_completion(app_state, &ctx, "Sign-in").await?;

  let guard = ctx.read();
  match (&guard.user, &guard.session_token) {
    (Some(user), Some(token)) => Ok(session_response(
      HttpResponse::Ok(),
      app_state,
      "Login successful",
      user,
      token,
    )),
    _ => {
      warn!("Sign-in pipeline completed without a user or session.");
      Err(AppError::Auth("Sign-in completed without a session.".to_string()))
    }
  }
}

#[instrument(name = "handler::login", skip(app_state, req_payload), fields(req_email = %req_payload.email))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<LoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  sign_in(&app_state, SigninAudience::Customer, payload.email, payload.password).await
}

#[instrument(name = "handler::admin_login", skip(app_state, req_payload), fields(req_username = %req_payload.username))]
pub async fn admin_login_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AdminLoginRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = req_payload.into_inner();
  sign_in(&app_state, SigninAudience::Admin, payload.username, payload.password).await
}

/// Always succeeds; drops the presented session if there is one.
#[instrument(name = "handler::logout", skip_all)]
pub async fn logout_handler(
  app_state: web::Data<AppState>,
  auth_user: Option<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
  if let Some(user) = auth_user {
    auth_service::end_session(app_state.store.as_ref(), &user.token).await?;
    info!(user_id = %user.principal.user_id, "Logged out.");
  }
  let mut removal = Cookie::build(SESSION_COOKIE, "").path("/").finish();
  removal.make_removal();
  Ok(
    HttpResponse::Ok()
      .cookie(removal)
      .json(json!({ "success": true, "message": "Logged out" })),
  )
}

#[instrument(name = "handler::check_auth", skip_all)]
pub async fn check_auth_handler(
  app_state: web::Data<AppState>,
  auth_user: Option<AuthenticatedUser>,
) -> Result<HttpResponse, AppError> {
  let user = match auth_user {
    Some(auth) => app_state.store.find_user(auth.principal.user_id).await?,
    None => None,
  };
  Ok(HttpResponse::Ok().json(match user {
    Some(user) => json!({ "success": true, "authenticated": true, "user": user_json(&user) }),
    None => json!({ "success": true, "authenticated": false }),
  }))
}
