// storefront/src/models/order_item.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price: Decimal, // snapshot at purchase time
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub unit_price: Decimal,
}

/// Line item as rendered inside an order listing.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderItemView {
  #[serde(skip_serializing)]
  pub order_id: Uuid,
  pub product_id: Uuid,
  pub name: String,
  pub quantity: i32,
  pub price: Decimal,
  pub image: String,
}
