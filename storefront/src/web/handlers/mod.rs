// storefront/src/web/handlers/mod.rs

pub mod admin_handlers;
pub mod auth_handlers;
pub mod cart_handlers;
pub mod order_handlers;
pub mod product_handlers;

use crate::errors::AppError;
use crate::state::AppState;
use crate::workflow::{ContextData, PipelineResult};

/// Runs the pipeline registered for `T`. A pipeline that stops instead of
/// completing is an internal error for an HTTP request.
pub(crate) async fn run_to_completion<T>(app_state: &AppState, ctx: &ContextData<T>, process: &str) -> Result<(), AppError>
where
  T: Send + Sync + 'static,
{
  match app_state.workflows.run(ctx.clone()).await? {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => {
      tracing::warn!(%process, "Pipeline was stopped by a handler.");
      Err(AppError::Internal(format!("{} was halted by an internal step.", process)))
    }
  }
}
