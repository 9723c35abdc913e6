// storefront/src/workflow/registry.rs

//! `Workflows<E>`: a registry of pipelines keyed by their context data type.

use super::context_data::ContextData;
use super::control::PipelineResult;
use super::error::{WorkflowError, WorkflowResult};
use super::pipeline::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, Level};

#[async_trait]
trait AnyPipelineRunner<ApplicationError>: Send + Sync
where
  ApplicationError: std::error::Error + Send + Sync + 'static,
{
  /// `ctx_obj` holds a `ContextData<TData>` for the wrapped pipeline's `TData`.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, ApplicationError>;
}

struct PipelineWrapper<TData, HandlerError>
where
  TData: 'static + Send + Sync,
  HandlerError: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  pipeline: Arc<Pipeline<TData, HandlerError>>,
}

#[async_trait]
impl<TData, HandlerError, ApplicationError> AnyPipelineRunner<ApplicationError> for PipelineWrapper<TData, HandlerError>
where
  TData: 'static + Send + Sync,
  HandlerError: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
  ApplicationError: std::error::Error + From<HandlerError> + From<WorkflowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, ApplicationError> {
    let typed_ctx_data = match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<ContextData<TData>>().to_string();
        event!(Level::ERROR, %expected_type, "Context object type mismatch.");
        return Err(ApplicationError::from(WorkflowError::TypeMismatch { expected_type }));
      }
    };
    self.pipeline.run(typed_ctx_data).await.map_err(ApplicationError::from)
  }
}

/// Registry of pipelines; `run` dispatches on the context data type and returns
/// `ApplicationError`.
pub struct Workflows<ApplicationError>
where
  ApplicationError: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  registry: RwLock<HashMap<TypeId, Arc<dyn AnyPipelineRunner<ApplicationError>>>>,
  _phantom_app_err: PhantomData<ApplicationError>,
}

impl<ApplicationError> Workflows<ApplicationError>
where
  ApplicationError: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      registry: RwLock::new(HashMap::new()),
      _phantom_app_err: PhantomData,
    }
  }

  /// Registers `pipeline`, replacing any pipeline already registered for `TData`.
  pub fn register_pipeline<TData, HandlerError>(&self, pipeline: Pipeline<TData, HandlerError>)
  where
    TData: 'static + Send + Sync,
    HandlerError: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
    ApplicationError: From<HandlerError>,
  {
    event!(Level::DEBUG, tdata_type = %std::any::type_name::<TData>(), "Registering pipeline.");
    let wrapper = PipelineWrapper {
      pipeline: Arc::new(pipeline),
    };
    self.registry.write().insert(TypeId::of::<TData>(), Arc::new(wrapper));
  }

  pub fn is_registered<TData: 'static>(&self) -> bool {
    self.registry.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the pipeline registered for `TData`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, ApplicationError>
  where
    TData: 'static + Send + Sync,
  {
    let runner = self.runner_for::<TData>().map_err(ApplicationError::from)?;
    let owned_ctx_obj: Box<dyn Any + Send> = Box::new(ctx_data);
    runner.run_erased(owned_ctx_obj).await
  }

  fn runner_for<TData: 'static>(&self) -> WorkflowResult<Arc<dyn AnyPipelineRunner<ApplicationError>>> {
    self.registry.read().get(&TypeId::of::<TData>()).cloned().ok_or_else(|| {
      let type_name = std::any::type_name::<TData>().to_string();
      event!(Level::ERROR, %type_name, "No pipeline registered.");
      WorkflowError::NotRegistered { type_name }
    })
  }
}

impl<ApplicationError> Default for Workflows<ApplicationError>
where
  ApplicationError: std::error::Error + From<WorkflowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
