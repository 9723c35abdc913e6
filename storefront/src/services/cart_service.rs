// storefront/src/services/cart_service.rs

//! Cart reads and edits that need no multi-step workflow. Adding to the cart
//! runs through the `add_to_cart` pipeline instead.

use crate::errors::{AppError, Result};
use crate::models::{CartLine, MAX_ITEM_QUANTITY};
use crate::store::Store;
use tracing::{info, instrument};
use uuid::Uuid;

#[instrument(name = "cart_service::get", skip(store))]
pub async fn get_cart(store: &dyn Store, user_id: Uuid) -> Result<Vec<CartLine>> {
  store.cart_lines(user_id).await
}

/// Overwrites the quantity of an existing row; `quantity <= 0` removes it and
/// anything over `MAX_ITEM_QUANTITY` is rejected.
#[instrument(name = "cart_service::update", skip(store), err(Display))]
pub async fn update_quantity(store: &dyn Store, user_id: Uuid, product_id: Uuid, quantity: i32) -> Result<()> {
  if quantity <= 0 {
    return remove_item(store, user_id, product_id).await;
  }
  if quantity > MAX_ITEM_QUANTITY {
    return Err(AppError::Validation(format!("Quantity must be at most {}", MAX_ITEM_QUANTITY)));
  }
  match store.set_cart_quantity(user_id, product_id, quantity).await? {
    0 => Err(AppError::NotFound("Cart item not found".to_string())),
    _ => {
      info!(quantity, "Cart quantity updated.");
      Ok(())
    }
  }
}

#[instrument(name = "cart_service::remove", skip(store), err(Display))]
pub async fn remove_item(store: &dyn Store, user_id: Uuid, product_id: Uuid) -> Result<()> {
  match store.delete_cart_item(user_id, product_id).await? {
    0 => Err(AppError::NotFound("Cart item not found".to_string())),
    _ => Ok(()),
  }
}

/// Always succeeds, even when the cart is already empty.
#[instrument(name = "cart_service::clear", skip(store))]
pub async fn clear_cart(store: &dyn Store, user_id: Uuid) -> Result<u64> {
  let removed = store.clear_cart(user_id).await?;
  info!(removed, "Cart cleared.");
  Ok(removed)
}
