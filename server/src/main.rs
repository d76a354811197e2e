// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use pizzeria_server::config::AppConfig;
use pizzeria_server::services::admin_service;
use pizzeria_server::state::AppState;
use pizzeria_server::store::{MemoryStore, PgStore, ShopStore};
use pizzeria_server::web::configure_app_routes;

fn init_tracing() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let json_output = std::env::var("LOG_FORMAT")
    .map(|v| v.eq_ignore_ascii_case("json"))
    .unwrap_or(false);

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE); // span durations
  if json_output {
    builder.json().init();
  } else {
    builder.init();
  }
}

async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn ShopStore>> {
  match &config.database_url {
    Some(url) => {
      let store = PgStore::connect(url, config.database_max_connections)
        .await
        .context("connecting to the database")?;
      store.migrate().await.context("applying migrations")?;
      tracing::info!("Connected to Postgres and applied migrations.");
      Ok(Arc::new(store))
    }
    None => {
      tracing::warn!("DATABASE_URL is not set; using the in-memory store. Data is lost on restart.");
      Ok(Arc::new(MemoryStore::with_default_catalog()))
    }
  }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  // .env must be loaded before the filter reads RUST_LOG.
  dotenvy::dotenv().ok();
  init_tracing();
  tracing::info!("Starting pizzeria server...");

  let app_config = AppConfig::from_env().context("loading configuration")?;
  let store = open_store(&app_config).await?;

  let outcome = admin_service::ensure_admin_account(store.as_ref(), &app_config)
    .await
    .context("bootstrapping the administrator account")?;
  tracing::info!(?outcome, "Administrator bootstrap finished.");

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  let app_state = AppState::new(store, app_config);

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)
  .with_context(|| format!("binding {}", server_address))?
  .run()
  .await
  .context("running the HTTP server")?;

  Ok(())
}
