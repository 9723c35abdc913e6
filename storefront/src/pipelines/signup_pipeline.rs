// storefront/src/pipelines/signup_pipeline.rs

use crate::errors::AppError;
use crate::models::{NewUser, Principal, UserRole};
use crate::pipelines::contexts::SignupCtxData;
use crate::services::auth_service;
use crate::workflow::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{event, info, warn, Level};

/// `local@domain.tld` with no whitespace.
pub fn looks_like_email(candidate: &str) -> bool {
  let Some((local, domain)) = candidate.split_once('@') else {
    return false;
  };
  !local.is_empty()
    && !candidate.chars().any(char::is_whitespace)
    && !domain.contains('@')
    && domain.split('.').count() >= 2
    && domain.split('.').all(|label| !label.is_empty())
}

pub fn register_signup_pipeline(workflows: &Workflows<AppError>) {
  let mut signup_p = Pipeline::<SignupCtxData, AppError>::new(&[
    ("validate_signup_input", false),
    ("check_existing_user_signup", false),
    ("create_user_in_db", false),
    ("issue_session_signup", false),
  ]);

  signup_p.on_root("validate_signup_input", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      guard.fullname = guard.fullname.trim().to_string();
      guard.email = guard.email.trim().to_string();
      guard.phone = guard
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

      event!(Level::DEBUG, email = %guard.email, "Validating signup input.");
      if guard.fullname.is_empty() {
        return Err(AppError::Validation("Missing required field: fullname".to_string()));
      }
      if !looks_like_email(&guard.email) {
        warn!("Invalid email format provided for signup.");
        return Err(AppError::Validation("Valid email is required.".to_string()));
      }
      if guard.password.chars().count() < auth_service::MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
          "Password must be at least {} characters long.",
          auth_service::MIN_PASSWORD_LEN
        )));
      }
      Ok(PipelineControl::Continue)
    })
  });

  signup_p.on_root("check_existing_user_signup", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (email, store) = {
        let guard = ctx_data.read();
        (guard.email.clone(), guard.app_state.store.clone())
      };

      if store.email_exists(&email).await? {
        warn!(%email, "Attempt to sign up with an existing email.");
        return Err(AppError::Conflict("Email already registered".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  signup_p.on_root("create_user_in_db", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (new_user_fields, password, store) = {
        let guard = ctx_data.read();
        (
          (guard.fullname.clone(), guard.email.clone(), guard.phone.clone()),
          guard.password.clone(),
          guard.app_state.store.clone(),
        )
      };
      let (fullname, email, phone) = new_user_fields;

      let password_hash = auth_service::hash_password(&password)?;
      let new_user = store
        .insert_user(NewUser {
          fullname,
          email,
          phone,
          password_hash,
          role: UserRole::User,
        })
        .await?;

      info!(user_id = %new_user.id, "User created.");
      ctx_data.write().created_user = Some(new_user);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signup_p.on_root("issue_session_signup", |ctx_data: ContextData<SignupCtxData>| {
    Box::pin(async move {
      let (user_id, store, ttl_hours) = {
        let guard = ctx_data.read();
        let user_id = guard
          .created_user
          .as_ref()
          .map(|u| u.id)
          .ok_or_else(|| AppError::Internal("Signup reached session issue without a user.".to_string()))?;
        (user_id, guard.app_state.store.clone(), guard.app_state.config.session_ttl_hours)
      };

      let principal = Principal {
        user_id,
        role: UserRole::User,
      };
      let token = auth_service::issue_session(store.as_ref(), principal, ttl_hours).await?;
      ctx_data.write().session_token = Some(token);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  workflows.register_pipeline(signup_p);
  info!("Sign-up pipeline registered.");
}

#[cfg(test)]
mod tests {
  use super::looks_like_email;

  #[test]
  fn email_shape() {
    assert!(looks_like_email("asha@example.com"));
    assert!(looks_like_email("a.b+tag@mail.dairy-x.com"));
    assert!(!looks_like_email("asha@example"));
    assert!(!looks_like_email("@example.com"));
    assert!(!looks_like_email("asha@@example.com"));
    assert!(!looks_like_email("asha @example.com"));
    assert!(!looks_like_email("asha@example..com"));
  }
}
