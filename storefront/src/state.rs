// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::store::Store;
use crate::workflow::Workflows;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub workflows: Arc<Workflows<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Builds the shared state and registers every pipeline against it.
  pub fn new(store: Arc<dyn Store>, config: Arc<AppConfig>) -> Self {
    let workflows = Workflows::<AppError>::new();
    pipelines::register_all_pipelines(&workflows);
    Self {
      store,
      workflows: Arc::new(workflows),
      config,
    }
  }
}
