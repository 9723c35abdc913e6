// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::models::{ProductStatus, MAX_ITEM_QUANTITY};
use crate::pipelines::contexts::AddToCartCtxData;
use crate::workflow::{ContextData, Pipeline, PipelineControl, Workflows};
use tracing::{info, warn};

pub fn register_add_to_cart_pipeline(workflows: &Workflows<AppError>) {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("validate_cart_input", false),
    ("fetch_product_for_cart", false),
    ("add_or_update_cart_item_db", false),
  ]);

  p.on_root("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let quantity = { ctx_data.read().quantity };

      if quantity <= 0 {
        warn!(quantity, "Add to cart rejected: quantity must be positive.");
        return Err(AppError::Validation("Quantity must be at least 1".to_string()));
      }
      if quantity > MAX_ITEM_QUANTITY {
        warn!(quantity, "Add to cart rejected: quantity over the limit.");
        return Err(AppError::Validation(format!("Quantity must be at most {}", MAX_ITEM_QUANTITY)));
      }
      Ok(PipelineControl::Continue)
    })
  });

  p.on_root("fetch_product_for_cart", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (product_id, store) = {
        let guard = ctx_data.read();
        (guard.product_id, guard.app_state.store.clone())
      };

      match store.find_product(product_id).await? {
        Some(product) if product.status == ProductStatus::Active => Ok(PipelineControl::Continue),
        Some(_) => {
          warn!(%product_id, "Add to cart for an inactive product.");
          Err(AppError::NotFound("Product not found".to_string()))
        }
        None => {
          warn!(%product_id, "Add to cart for an unknown product.");
          Err(AppError::NotFound("Product not found".to_string()))
        }
      }
    })
  });

  p.on_root("add_or_update_cart_item_db", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (user_id, product_id, quantity, store) = {
        let guard = ctx_data.read();
        (
          guard.authenticated_user_id,
          guard.product_id,
          guard.quantity,
          guard.app_state.store.clone(),
        )
      };

      let Some(new_quantity) = store.add_cart_quantity(user_id, product_id, quantity).await? else {
        warn!(%user_id, %product_id, quantity, "Cart line would exceed the quantity limit.");
        return Err(AppError::Validation(format!(
          "Cart quantity for this product cannot exceed {}",
          MAX_ITEM_QUANTITY
        )));
      };
      info!(%user_id, %product_id, new_quantity, "Cart item added or incremented.");
      ctx_data.write().new_quantity = Some(new_quantity);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  workflows.register_pipeline(p);
  info!("Add-to-cart pipeline registered.");
}
