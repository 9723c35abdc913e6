// storefront/src/models/statistics.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Statistics {
  pub total_users: i64,
  pub total_orders: i64,
  /// Sum of `total_amount` over orders that are not cancelled.
  pub total_revenue: Decimal,
  pub total_products: i64,
  pub pending_orders: i64,
}
