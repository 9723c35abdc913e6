// storefront/src/services/admin_service.rs

//! Admin dashboard reads and the order status transition.

use crate::errors::{AppError, Result};
use crate::models::{AdminCartLine, OrderStatus, OrderWithItems, Statistics, User};
use crate::services::order_queries;
use crate::store::Store;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub async fn list_customers(store: &dyn Store) -> Result<Vec<User>> {
  store.list_customers().await
}

pub async fn list_cart_lines(store: &dyn Store) -> Result<Vec<AdminCartLine>> {
  store.all_cart_lines().await
}

#[instrument(name = "admin_service::list_orders", skip(store))]
pub async fn list_orders(store: &dyn Store) -> Result<Vec<OrderWithItems>> {
  let orders = store.all_orders().await?;
  order_queries::with_items(store, orders.into_iter().map(|(o, email)| (o, Some(email))).collect()).await
}

pub async fn statistics(store: &dyn Store) -> Result<Statistics> {
  store.statistics().await
}

/// Sets `status` on the order. Any status may move to any other.
#[instrument(name = "admin_service::update_order_status", skip(store), err(Display))]
pub async fn update_order_status(store: &dyn Store, order_id: Uuid, status: &str) -> Result<OrderStatus> {
  let new_status = OrderStatus::parse(status).ok_or_else(|| {
    warn!(%status, "Rejected unknown order status.");
    AppError::Validation("Invalid status".to_string())
  })?;
  match store.set_order_status(order_id, new_status).await? {
    0 => Err(AppError::NotFound("Order not found".to_string())),
    _ => {
      info!(status = new_status.as_str(), "Order status updated.");
      Ok(new_status)
    }
  }
}
