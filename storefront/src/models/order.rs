// storefront/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

use super::order_item::OrderItemView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Processing,
  Completed,
  Cancelled,
}

impl OrderStatus {
  pub const ALL: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::Processing,
    OrderStatus::Completed,
    OrderStatus::Cancelled,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Processing => "processing",
      OrderStatus::Completed => "completed",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  /// Exact, lowercase match only.
  pub fn parse(value: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|s| s.as_str() == value)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "payment_method", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
  Cod,
  Phonepe,
  Qrcode,
}

impl PaymentMethod {
  pub fn parse(value: &str) -> Option<Self> {
    match value {
      "cod" => Some(PaymentMethod::Cod),
      "phonepe" => Some(PaymentMethod::Phonepe),
      "qrcode" => Some(PaymentMethod::Qrcode),
      _ => None,
    }
  }

  /// Cash on delivery is settled later; the online methods arrive verified.
  pub fn initial_payment_status(&self) -> PaymentStatus {
    match self {
      PaymentMethod::Cod => PaymentStatus::Pending,
      PaymentMethod::Phonepe | PaymentMethod::Qrcode => PaymentStatus::Verified,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, SqlxType)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Verified,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: Uuid,
  pub fullname: String,
  pub phone: String,
  pub email: String,
  pub address: String,
  pub city: String,
  pub state: String,
  pub pincode: String,
  pub landmark: Option<String>,
  pub total_amount: Decimal,
  pub delivery_fee: Decimal,
  pub tax_amount: Decimal,
  pub status: OrderStatus,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
  pub transaction_id: Option<String>,
  pub order_date: DateTime<Utc>,
}

/// Header values for a new order; id and totals are fixed before insertion.
#[derive(Debug, Clone)]
pub struct NewOrder {
  pub id: Uuid,
  pub user_id: Uuid,
  pub fullname: String,
  pub phone: String,
  pub email: String,
  pub address: String,
  pub city: String,
  pub state: String,
  pub pincode: String,
  pub landmark: Option<String>,
  pub total_amount: Decimal,
  pub delivery_fee: Decimal,
  pub tax_amount: Decimal,
  pub payment_method: PaymentMethod,
  pub payment_status: PaymentStatus,
  pub transaction_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
  #[serde(flatten)]
  pub order: Order,
  /// Account email of the owner; only filled for admin listings.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_email: Option<String>,
  pub items: Vec<OrderItemView>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_parse_is_exact() {
    assert_eq!(OrderStatus::parse("processing"), Some(OrderStatus::Processing));
    assert_eq!(OrderStatus::parse("Processing"), None);
    assert_eq!(OrderStatus::parse("shipped"), None);
  }

  #[test]
  fn payment_status_follows_method() {
    assert_eq!(PaymentMethod::Cod.initial_payment_status(), PaymentStatus::Pending);
    assert_eq!(PaymentMethod::parse("qrcode").map(|m| m.initial_payment_status()), Some(PaymentStatus::Verified));
    assert_eq!(PaymentMethod::parse("card"), None);
  }
}
