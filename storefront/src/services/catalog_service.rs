// storefront/src/services/catalog_service.rs

use crate::errors::{AppError, Result};
use crate::models::{Category, Product};
use crate::store::Store;
use tracing::instrument;
use uuid::Uuid;

pub async fn list_categories(store: &dyn Store) -> Result<Vec<Category>> {
  store.list_categories().await
}

#[instrument(name = "catalog_service::list_products", skip(store))]
pub async fn list_products(store: &dyn Store, category: Option<&str>) -> Result<Vec<Product>> {
  let category = category.map(str::trim).filter(|c| !c.is_empty());
  store.list_products(category).await
}

pub async fn get_product(store: &dyn Store, product_id: Uuid) -> Result<Product> {
  store
    .find_product(product_id)
    .await?
    .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}
