// storefront/src/store/seed.rs

//! Starter catalog and admin account, applied when `SEED_DB=true`.

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::Store;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::{NewProduct, NewUser, ProductStatus, UserRole};
use crate::services::auth_service;

/// (category, name, price in paise, image)
const STARTER_PRODUCTS: &[(&str, &str, i64, &str)] = &[
  ("Milk", "Cow Milk", 6000, "images/cow-milk.jpg"),
  ("Milk", "Buffalo Milk", 7000, "images/buffalo-milk.jpg"),
  ("Milk", "Toned Milk", 5400, "images/toned-milk.jpg"),
  ("Cream", "Fresh Cream", 12000, "images/fresh-cream.jpg"),
  ("Cream", "Malai", 15000, "images/malai.jpg"),
  ("Sweet", "Rasgulla", 25000, "images/rasgulla.jpg"),
  ("Sweet", "Peda", 40000, "images/peda.jpg"),
  ("Sweet", "Shrikhand", 18000, "images/shrikhand.jpg"),
];

/// Idempotent for categories and the admin account; products are only added
/// to a catalog with no rows at all, active or inactive.
#[instrument(name = "seed::seed_store", skip_all, err(Display))]
pub async fn seed_store(store: &dyn Store, config: &AppConfig) -> Result<()> {
  if store.count_products().await? == 0 {
    for (category, name, price_paise, image) in STARTER_PRODUCTS {
      let category_id = store.ensure_category(category).await?;
      store
        .insert_product(NewProduct {
          name: (*name).to_string(),
          price: Decimal::new(*price_paise, 2),
          image: (*image).to_string(),
          category_id,
          status: ProductStatus::Active,
        })
        .await?;
    }
    info!(count = STARTER_PRODUCTS.len(), "Seeded starter products.");
  }

  let Some(password) = &config.admin_password else {
    warn!("ADMIN_PASSWORD not set; admin account not seeded.");
    return Ok(());
  };
  if store.find_user_by_email(&config.admin_email, UserRole::Admin).await?.is_some() {
    info!("Admin account already present.");
    return Ok(());
  }
  if store.email_exists(&config.admin_email).await? {
    warn!(email = %config.admin_email, "ADMIN_EMAIL belongs to a customer account; admin account not seeded.");
    return Ok(());
  }
  let password_hash = auth_service::hash_password(password)?;
  store
    .insert_user(NewUser {
      fullname: "Administrator".to_string(),
      email: config.admin_email.clone(),
      phone: None,
      password_hash,
      role: UserRole::Admin,
    })
    .await?;
  info!(email = %config.admin_email, "Seeded admin account.");
  Ok(())
}
