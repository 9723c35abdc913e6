// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;

use dairyx::config::AppConfig;
use dairyx::state::AppState;
use dairyx::store::{seed, PgStore, Store};
use dairyx::{telemetry, web};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let app_config = Arc::new(AppConfig::from_env().context("Failed to load application configuration")?);
  telemetry::init_tracing(app_config.log_format);
  tracing::info!("Starting Dairy-X storefront server...");

  let pg_store = PgStore::connect(&app_config)
    .await
    .context("Failed to connect to the database")?;
  pg_store.run_migrations().await.context("Failed to run database migrations")?;
  tracing::info!("Database migrations applied.");

  if app_config.seed_db {
    seed::seed_store(&pg_store, &app_config)
      .await
      .context("Failed to seed the database")?;
  }

  let store: Arc<dyn Store> = Arc::new(pg_store);
  let app_state = AppState::new(store, app_config.clone());

  let server_address = app_config.server_address();
  tracing::info!("Binding server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(web::configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("Failed to bind {}", server_address))?
  .run()
  .await
  .context("HTTP server terminated with an error")?;

  Ok(())
}
