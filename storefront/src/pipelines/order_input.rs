// storefront/src/pipelines/order_input.rs

//! Checkout payload as submitted, and its validated form.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{PaymentMethod, MAX_ITEM_QUANTITY};
use crate::services::pricing;

/// Raw checkout body. Every field is optional so that a missing field yields
/// a field-specific message instead of a generic JSON error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceOrderPayload {
  pub fullname: Option<String>,
  pub phone: Option<String>,
  pub email: Option<String>,
  pub address: Option<String>,
  pub city: Option<String>,
  pub state: Option<String>,
  pub pincode: Option<String>,
  pub landmark: Option<String>,
  pub payment_method: Option<String>,
  pub transaction_id: Option<String>,
  #[serde(default)]
  pub items: Vec<OrderItemPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderItemPayload {
  pub product_id: Option<Uuid>,
  pub name: Option<String>,
  pub quantity: Option<i32>,
  pub price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProductRef {
  Id(Uuid),
  /// Resolved by exact name when no id was sent.
  Name(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
  pub product: ProductRef,
  pub quantity: i32,
  pub unit_price: Decimal,
}

#[derive(Debug, Clone)]
pub struct ShippingDetails {
  pub fullname: String,
  pub phone: String,
  pub email: String,
  pub address: String,
  pub city: String,
  pub state: String,
  pub pincode: String,
  pub landmark: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
  pub shipping: ShippingDetails,
  pub payment_method: PaymentMethod,
  pub transaction_id: Option<String>,
  pub lines: Vec<OrderLine>,
}

fn trimmed(value: &Option<String>) -> Option<String> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

fn required(value: &Option<String>, field: &str) -> Result<String, AppError> {
  trimmed(value).ok_or_else(|| AppError::Validation(format!("Missing required field: {}", field)))
}

/// Checks presence of shipping fields, then the payment method, then the items.
pub fn validate_place_order(payload: &PlaceOrderPayload) -> Result<PlaceOrderRequest, AppError> {
  let shipping = ShippingDetails {
    fullname: required(&payload.fullname, "fullname")?,
    phone: required(&payload.phone, "phone")?,
    email: required(&payload.email, "email")?,
    address: required(&payload.address, "address")?,
    city: required(&payload.city, "city")?,
    state: required(&payload.state, "state")?,
    pincode: required(&payload.pincode, "pincode")?,
    landmark: trimmed(&payload.landmark),
  };
  let method_raw = required(&payload.payment_method, "payment_method")?;
  let payment_method = PaymentMethod::parse(&method_raw)
    .ok_or_else(|| AppError::Validation(format!("Invalid payment method: {}", method_raw)))?;

  if payload.items.is_empty() {
    return Err(AppError::Validation("Missing required field: items".to_string()));
  }
  let lines = payload
    .items
    .iter()
    .enumerate()
    .map(|(idx, item)| validate_item(idx + 1, item))
    .collect::<Result<Vec<_>, _>>()?;

  Ok(PlaceOrderRequest {
    shipping,
    payment_method,
    transaction_id: trimmed(&payload.transaction_id),
    lines,
  })
}

fn validate_item(position: usize, item: &OrderItemPayload) -> Result<OrderLine, AppError> {
  let product = match (item.product_id, trimmed(&item.name)) {
    (Some(id), _) => ProductRef::Id(id),
    (None, Some(name)) => ProductRef::Name(name),
    (None, None) => {
      return Err(AppError::Validation(format!(
        "Item {}: product_id or name is required",
        position
      )))
    }
  };
  let quantity = item
    .quantity
    .filter(|q| *q >= 1)
    .ok_or_else(|| AppError::Validation(format!("Item {}: quantity must be at least 1", position)))?;
  if quantity > MAX_ITEM_QUANTITY {
    return Err(AppError::Validation(format!(
      "Item {}: quantity must be at most {}",
      position, MAX_ITEM_QUANTITY
    )));
  }
  let unit_price = item.price.filter(|p| pricing::is_valid_price(*p)).ok_or_else(|| {
    AppError::Validation(format!(
      "Item {}: price must be a non-negative amount up to {} with at most two decimal places",
      position,
      pricing::MAX_AMOUNT
    ))
  })?;
  Ok(OrderLine {
    product,
    quantity,
    unit_price,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn complete_payload() -> PlaceOrderPayload {
    PlaceOrderPayload {
      fullname: Some("Asha Patil".into()),
      phone: Some("9800000000".into()),
      email: Some("asha@example.com".into()),
      address: Some("12 Dairy Lane".into()),
      city: Some("Pune".into()),
      state: Some("MH".into()),
      pincode: Some("411001".into()),
      landmark: Some("   ".into()),
      payment_method: Some("cod".into()),
      transaction_id: None,
      items: vec![OrderItemPayload {
        product_id: None,
        name: Some("Cow Milk".into()),
        quantity: Some(2),
        price: Some(Decimal::new(6000, 2)),
      }],
    }
  }

  fn validation_message(payload: &PlaceOrderPayload) -> String {
    match validate_place_order(payload) {
      Err(AppError::Validation(m)) => m,
      other => panic!("expected validation error, got {:?}", other.map(|r| r.lines)),
    }
  }

  #[test]
  fn accepts_complete_payload() {
    let req = validate_place_order(&complete_payload()).unwrap();
    assert_eq!(req.payment_method, PaymentMethod::Cod);
    assert_eq!(req.shipping.landmark, None);
    assert_eq!(req.lines[0].product, ProductRef::Name("Cow Milk".into()));
  }

  #[test]
  fn reports_first_missing_field() {
    let mut payload = complete_payload();
    payload.city = Some("  ".into());
    payload.pincode = None;
    assert_eq!(validation_message(&payload), "Missing required field: city");
  }

  #[test]
  fn rejects_unknown_payment_method_before_items() {
    let mut payload = complete_payload();
    payload.payment_method = Some("card".into());
    payload.items.clear();
    assert!(validation_message(&payload).starts_with("Invalid payment method"));
  }

  #[test]
  fn rejects_empty_items_and_bad_lines() {
    let mut payload = complete_payload();
    payload.items.clear();
    assert_eq!(validation_message(&payload), "Missing required field: items");

    let mut payload = complete_payload();
    payload.items[0].quantity = Some(0);
    assert!(validation_message(&payload).starts_with("Item 1: quantity"));

    let mut payload = complete_payload();
    payload.items.push(OrderItemPayload {
      product_id: None,
      name: None,
      quantity: Some(1),
      price: Some(Decimal::ONE),
    });
    assert!(validation_message(&payload).starts_with("Item 2: product_id or name"));

    let mut payload = complete_payload();
    payload.items[0].price = Some(Decimal::new(1005, 3));
    assert!(validation_message(&payload).starts_with("Item 1: price"));
  }

  #[test]
  fn rejects_oversized_lines() {
    let mut payload = complete_payload();
    payload.items[0].quantity = Some(i32::MAX);
    assert_eq!(validation_message(&payload), "Item 1: quantity must be at most 1000");

    let mut payload = complete_payload();
    payload.items[0].price = Some(Decimal::from_i128_with_scale(10_000_000_000_000_000_000_000_000, 0));
    assert!(validation_message(&payload).starts_with("Item 1: price"));
  }
}
