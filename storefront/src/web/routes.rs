// storefront/src/web/routes.rs

use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::handlers::{admin_handlers, auth_handlers, cart_handlers, order_handlers, product_handlers};

async fn health_check_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  app_state.store.ping().await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "status": "ok",
    "backend": app_state.store.backend_tag(),
  })))
}

/// Mounts every route under `/api`. Malformed JSON bodies, query strings and
/// path segments answer with the regular 400 envelope.
pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(
      web::JsonConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid request body: {}", err)).into()),
    )
    .app_data(
      web::QueryConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid query string: {}", err)).into()),
    )
    .app_data(
      web::PathConfig::default()
        .error_handler(|err, _req| AppError::Validation(format!("Invalid path parameter: {}", err)).into()),
    );

  cfg.service(
    web::scope("/api")
      .route("/health", web::get().to(health_check_handler))
      .route("/categories", web::get().to(product_handlers::list_categories_handler))
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      )
      .service(
        web::scope("/auth")
          .route("/register", web::post().to(auth_handlers::register_handler))
          .route("/login", web::post().to(auth_handlers::login_handler))
          .route("/admin_login", web::post().to(auth_handlers::admin_login_handler))
          .route("/logout", web::post().to(auth_handlers::logout_handler))
          .route("/check", web::get().to(auth_handlers::check_auth_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("/add", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/update", web::post().to(cart_handlers::update_cart_handler))
          .route("/delete", web::post().to(cart_handlers::delete_cart_item_handler))
          .route("/clear", web::post().to(cart_handlers::clear_cart_handler)),
      )
      .service(
        web::scope("/orders")
          .route("/place", web::post().to(order_handlers::place_order_handler))
          .route("/get", web::get().to(order_handlers::get_orders_handler))
          .route("/details", web::get().to(order_handlers::order_details_handler)),
      )
      .service(
        web::scope("/admin")
          .route("/users", web::get().to(admin_handlers::list_users_handler))
          .route("/carts", web::get().to(admin_handlers::list_carts_handler))
          .route("/orders", web::get().to(admin_handlers::list_orders_handler))
          .route("/statistics", web::get().to(admin_handlers::statistics_handler))
          .route("/update_order_status", web::post().to(admin_handlers::update_order_status_handler)),
      ),
  );
}
