// storefront/src/models/cart_item.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Upper bound for a cart row and for one order line.
pub const MAX_ITEM_QUANTITY: i32 = 1_000;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartItem {
  pub id: Uuid,
  pub user_id: Uuid,
  pub product_id: Uuid,
  pub quantity: i32,
  pub added_at: DateTime<Utc>,
}

/// A cart row as its owner sees it, with current product details.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CartLine {
  pub cart_id: Uuid,
  pub product_id: Uuid,
  pub name: String,
  pub price: Decimal,
  pub image: String,
  pub category: String,
  pub quantity: i32,
  pub added_at: DateTime<Utc>,
}

/// A cart row across all users for the admin dashboard.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminCartLine {
  pub cart_id: Uuid,
  pub user_id: Uuid,
  pub user_email: String,
  pub user_name: String,
  pub product_id: Uuid,
  pub product_name: String,
  pub price: Decimal,
  pub image: String,
  pub quantity: i32,
  pub total_price: Decimal,
  pub added_at: DateTime<Utc>,
}
