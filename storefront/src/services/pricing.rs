// storefront/src/services/pricing.rs

//! Order total computation in fixed-point decimal.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::errors::AppError;

/// Flat delivery charge per order.
pub const DELIVERY_FEE: Decimal = Decimal::from_parts(5000, 0, 0, false, 2);
/// 5% tax on the item subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(5, 0, 0, false, 2);
/// Largest amount a `NUMERIC(12,2)` column holds: 9,999,999,999.99.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xD4A5_0FFF, 0xE8, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
  pub subtotal: Decimal,
  pub delivery_fee: Decimal,
  pub tax_amount: Decimal,
  pub total_amount: Decimal,
}

fn too_large() -> AppError {
  AppError::Validation("Order total exceeds the maximum supported amount".to_string())
}

/// Computes totals from `(unit_price, quantity)` lines. Fails when any
/// intermediate overflows or the total does not fit `MAX_AMOUNT`.
pub fn compute_totals(lines: impl IntoIterator<Item = (Decimal, i32)>) -> Result<OrderTotals, AppError> {
  let subtotal = lines.into_iter().try_fold(Decimal::ZERO, |acc, (price, qty)| {
    price.checked_mul(Decimal::from(qty)).and_then(|line| acc.checked_add(line))
  });
  let subtotal = subtotal.ok_or_else(too_large)?;
  let tax_amount = subtotal
    .checked_mul(TAX_RATE)
    .ok_or_else(too_large)?
    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
  let total_amount = subtotal
    .checked_add(DELIVERY_FEE)
    .and_then(|t| t.checked_add(tax_amount))
    .filter(|t| *t <= MAX_AMOUNT)
    .ok_or_else(too_large)?;
  Ok(OrderTotals {
    subtotal,
    delivery_fee: DELIVERY_FEE,
    tax_amount,
    total_amount,
  })
}

/// A price is acceptable when it is non-negative with at most two decimal
/// places and fits `MAX_AMOUNT`.
pub fn is_valid_price(price: Decimal) -> bool {
  !price.is_sign_negative() && price.normalize().scale() <= 2 && price <= MAX_AMOUNT
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
  }

  #[test]
  fn mixed_cart_totals() {
    let totals = compute_totals([(d("100"), 2), (d("50"), 1)]).unwrap();
    assert_eq!(totals.subtotal, d("250"));
    assert_eq!(totals.tax_amount, d("12.50"));
    assert_eq!(totals.delivery_fee, d("50.00"));
    assert_eq!(totals.total_amount, d("312.50"));
  }

  #[test]
  fn tax_rounds_half_away_from_zero() {
    // 0.05 * 0.10 = 0.005
    let totals = compute_totals([(d("0.10"), 1)]).unwrap();
    assert_eq!(totals.tax_amount, d("0.01"));
    // 0.05 * 12.34 = 0.617
    assert_eq!(compute_totals([(d("12.34"), 1)]).unwrap().tax_amount, d("0.62"));
  }

  #[test]
  fn total_is_subtotal_plus_fee_plus_tax() {
    let totals = compute_totals([(d("19.99"), 3), (d("7.25"), 4)]).unwrap();
    assert_eq!(totals.total_amount, totals.subtotal + totals.delivery_fee + totals.tax_amount);
    assert_eq!(totals.total_amount.round_dp(2), totals.total_amount);
  }

  #[test]
  fn price_validation() {
    assert!(is_valid_price(d("0")));
    assert!(is_valid_price(d("10.50")));
    assert!(is_valid_price(d("10.500")));
    assert!(!is_valid_price(d("10.505")));
    assert!(!is_valid_price(d("-1")));
    assert!(is_valid_price(d("9999999999.99")));
    assert!(!is_valid_price(d("10000000000")));
  }

  #[test]
  fn constants_hold_expected_values() {
    assert_eq!(DELIVERY_FEE, d("50.00"));
    assert_eq!(TAX_RATE, d("0.05"));
    assert_eq!(MAX_AMOUNT, d("9999999999.99"));
  }

  #[test]
  fn oversized_lines_are_rejected_not_panicking() {
    let huge = d("10000000000000000000000000");
    assert!(matches!(compute_totals([(huge, i32::MAX)]), Err(AppError::Validation(_))));
    // Each line fits, but the sum pushes the total past NUMERIC(12,2).
    let err = compute_totals([(d("9999999999.99"), 1), (d("1"), 1)]).unwrap_err();
    assert!(matches!(err, AppError::Validation(ref m) if m.contains("maximum")));
  }
}
