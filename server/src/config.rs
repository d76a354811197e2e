// server/src/config.rs

use crate::errors::{AppError, Result};
use crate::models::money;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEV_JWT_SECRET: &str = "pizzeria-development-secret-change-me";

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// `None` runs the server against the in-process store.
  pub database_url: Option<String>,
  pub database_max_connections: u32,

  pub jwt_secret: String,
  pub token_ttl: Duration,
  pub admin_token_ttl: Duration,

  pub login_max_failures: u32,
  pub login_window: Duration,

  pub custom_pizza_base_price_cents: i64,
  pub legacy_avg_pizza_price_cents: i64,

  pub admin_email: String,
  pub admin_password: Option<String>,

  pub password_hash_memory_kib: u32,
  pub password_hash_iterations: u32,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the configuration from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(&get, "SERVER_PORT", 3001u16)?;
    let database_url = get("DATABASE_URL");
    let database_max_connections = parse_or(&get, "DATABASE_MAX_CONNECTIONS", 5u32)?;

    let jwt_secret = match get("JWT_SECRET") {
      Some(secret) => secret,
      None => {
        tracing::warn!("JWT_SECRET is not set; using the development secret. Do not run like this in production.");
        DEV_JWT_SECRET.to_string()
      }
    };
    let token_ttl = Duration::from_secs(parse_or(&get, "TOKEN_TTL_SECS", 3600u64)?);
    let admin_token_ttl = Duration::from_secs(parse_or(&get, "ADMIN_TOKEN_TTL_SECS", 14_400u64)?);

    let login_max_failures = parse_or(&get, "LOGIN_MAX_FAILURES", 5u32)?;
    let login_window = Duration::from_secs(parse_or(&get, "LOGIN_WINDOW_SECS", 30u64)?);

    let custom_pizza_base_price_cents = price_or(&get, "CUSTOM_PIZZA_BASE_PRICE", 700)?;
    let legacy_avg_pizza_price_cents = price_or(&get, "LEGACY_AVG_PIZZA_PRICE", 1200)?;
    if legacy_avg_pizza_price_cents <= 0 {
      return Err(AppError::Config("LEGACY_AVG_PIZZA_PRICE must be positive".to_string()));
    }

    let admin_email = get("ADMIN_EMAIL")
      .unwrap_or_else(|| "admin@pizzashop.local".to_string())
      .to_lowercase();
    let admin_password = get("ADMIN_PASSWORD");

    let password_hash_memory_kib = parse_or(&get, "PASSWORD_HASH_MEMORY_KIB", 19_456u32)?;
    let password_hash_iterations = parse_or(&get, "PASSWORD_HASH_ITERATIONS", 2u32)?;

    tracing::info!(
      server_port,
      persistent = database_url.is_some(),
      "Application configuration loaded successfully."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      jwt_secret,
      token_ttl,
      admin_token_ttl,
      login_max_failures,
      login_window,
      custom_pizza_base_price_cents,
      legacy_avg_pizza_price_cents,
      admin_email,
      admin_password,
      password_hash_memory_kib,
      password_hash_iterations,
    })
  }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match get(name) {
    Some(raw) => raw
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e))),
    None => Ok(default),
  }
}

fn price_or(get: &impl Fn(&str) -> Option<String>, name: &str, default_cents: i64) -> Result<i64> {
  match get(name) {
    Some(raw) => {
      let value = raw
        .parse::<f64>()
        .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", name, raw, e)))?;
      money::cents_from_decimal(value)
        .filter(|cents| *cents >= 0)
        .ok_or_else(|| AppError::Config(format!("Invalid {} value '{}'", name, raw)))
    }
    None => Ok(default_cents),
  }
}
