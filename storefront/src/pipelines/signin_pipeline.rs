// storefront/src/pipelines/signin_pipeline.rs

use crate::errors::AppError;
use crate::models::{Principal, UserRole};
use crate::pipelines::contexts::{SigninAudience, SigninCtxData};
use crate::services::auth_service;
use crate::workflow::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{event, info, warn, Level};

impl SigninAudience {
  fn role(&self) -> UserRole {
    match self {
      SigninAudience::Customer => UserRole::User,
      SigninAudience::Admin => UserRole::Admin,
    }
  }

  fn not_found_message(&self) -> &'static str {
    match self {
      SigninAudience::Customer => "User not found",
      SigninAudience::Admin => "Admin not found",
    }
  }
}

/// Customer login and admin login share this pipeline; `audience` picks the
/// account role and the admin username alias.
pub fn register_signin_pipeline(workflows: &Workflows<AppError>) {
  let mut signin_p = Pipeline::<SigninCtxData, AppError>::new(&[
    ("validate_signin_input", false),
    ("resolve_signin_email", false),
    ("fetch_user_by_email_signin", false),
    ("verify_user_password_signin", false),
    ("issue_session_token_signin", false),
  ]);

  signin_p.on_root("validate_signin_input", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      guard.identifier = guard.identifier.trim().to_string();
      if guard.identifier.is_empty() || guard.password.is_empty() {
        let message = match guard.audience {
          SigninAudience::Customer => "Email and password are required",
          SigninAudience::Admin => "Username and password are required",
        };
        return Err(AppError::Validation(message.to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  signin_p.on_root("resolve_signin_email", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let resolved = match guard.audience {
        SigninAudience::Admin if guard.identifier == guard.app_state.config.admin_username => {
          guard.app_state.config.admin_email.clone()
        }
        _ => guard.identifier.clone(),
      };
      event!(Level::DEBUG, email = %resolved, "Sign-in email resolved.");
      guard.resolved_email = Some(resolved);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  signin_p.on_root("fetch_user_by_email_signin", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (email, audience, store) = {
        let guard = ctx_data.read();
        (
          guard.resolved_email.clone().unwrap_or_default(),
          guard.audience,
          guard.app_state.store.clone(),
        )
      };

      match store.find_user_by_email(&email, audience.role()).await? {
        Some(user) => {
          ctx_data.write().user = Some(user);
          Ok(PipelineControl::Continue)
        }
        None => {
          warn!(%email, ?audience, "Sign-in for unknown account.");
          Err(AppError::NotFound(audience.not_found_message().to_string()))
        }
      }
    })
  });

  signin_p.on_root("verify_user_password_signin", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let stored_hash = guard
        .user
        .as_ref()
        .map(|u| u.password_hash.as_str())
        .ok_or_else(|| AppError::Internal("Password check reached without a user.".to_string()))?;

      if !auth_service::verify_password(stored_hash, &guard.password)? {
        warn!(email = ?guard.resolved_email, "Sign-in with invalid password.");
        return Err(AppError::Auth("Invalid password".to_string()));
      }
      Ok(PipelineControl::Continue)
    })
  });

  signin_p.on_root("issue_session_token_signin", |ctx_data: ContextData<SigninCtxData>| {
    Box::pin(async move {
      let (principal, store, ttl_hours) = {
        let guard = ctx_data.read();
        let user = guard
          .user
          .as_ref()
          .ok_or_else(|| AppError::Internal("Session issue reached without a user.".to_string()))?;
        (
          Principal {
            user_id: user.id,
            role: user.role,
          },
          guard.app_state.store.clone(),
          guard.app_state.config.session_ttl_hours,
        )
      };

      let token = auth_service::issue_session(store.as_ref(), principal, ttl_hours).await?;
      info!(user_id = %principal.user_id, "Sign-in successful.");
      ctx_data.write().session_token = Some(token);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  workflows.register_pipeline(signin_p);
  info!("Sign-in pipeline registered.");
}
