// storefront/src/services/order_queries.rs

//! Read-side order projections for the owning customer.

use std::collections::HashMap;

use crate::errors::{AppError, Result};
use crate::models::{Order, OrderItemView, OrderWithItems};
use crate::store::Store;
use tracing::instrument;
use uuid::Uuid;

/// Attaches line items to each order, preserving the order of `orders`.
pub(crate) async fn with_items(
  store: &dyn Store,
  orders: Vec<(Order, Option<String>)>,
) -> Result<Vec<OrderWithItems>> {
  let ids: Vec<Uuid> = orders.iter().map(|(o, _)| o.id).collect();
  let mut items_by_order: HashMap<Uuid, Vec<OrderItemView>> = HashMap::new();
  for item in store.order_items(&ids).await? {
    items_by_order.entry(item.order_id).or_default().push(item);
  }
  Ok(
    orders
      .into_iter()
      .map(|(order, user_email)| OrderWithItems {
        items: items_by_order.remove(&order.id).unwrap_or_default(),
        order,
        user_email,
      })
      .collect(),
  )
}

#[instrument(name = "order_queries::orders_for_user", skip(store))]
pub async fn orders_for_user(store: &dyn Store, user_id: Uuid) -> Result<Vec<OrderWithItems>> {
  let orders = store.orders_for_user(user_id).await?;
  with_items(store, orders.into_iter().map(|o| (o, None)).collect()).await
}

/// One order, visible only to its owner.
#[instrument(name = "order_queries::order_details", skip(store))]
pub async fn order_details(store: &dyn Store, user_id: Uuid, order_id: Uuid) -> Result<OrderWithItems> {
  let order = store
    .order_for_user(user_id, order_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
  let mut found = with_items(store, vec![(order, None)]).await?;
  found
    .pop()
    .ok_or_else(|| AppError::Internal("Order lookup lost its row".to_string()))
}
