// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Pretty,
  Json,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,

  // Seeding runs on startup when enabled; the admin account needs a password.
  pub seed_db: bool,
  pub admin_username: String,
  pub admin_email: String,
  pub admin_password: Option<String>,

  pub session_ttl_hours: i64,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|var_name| env::var(var_name).ok())
  }

  /// Builds the configuration from an arbitrary variable source.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_env = |var_name: &str| {
      lookup(var_name)
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", var_name)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let database_url = get_env("DATABASE_URL")?;
    let database_max_connections = get_env("DATABASE_MAX_CONNECTIONS")
      .unwrap_or_else(|_| "10".to_string())
      .parse::<u32>()
      .map_err(|e| AppError::Config(format!("Invalid DATABASE_MAX_CONNECTIONS: {}", e)))?;

    let seed_db = get_env("SEED_DB")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;
    let admin_username = get_env("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let admin_email = get_env("ADMIN_EMAIL").unwrap_or_else(|_| "admin@dairy-x.com".to_string());
    let admin_password = get_env("ADMIN_PASSWORD").ok();

    let session_ttl_hours = get_env("SESSION_TTL_HOURS")
      .unwrap_or_else(|_| "24".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid SESSION_TTL_HOURS: {}", e)))?;
    if session_ttl_hours <= 0 {
      return Err(AppError::Config("SESSION_TTL_HOURS must be positive".to_string()));
    }

    let log_format = match get_env("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()).as_str() {
      "pretty" => LogFormat::Pretty,
      "json" => LogFormat::Json,
      other => return Err(AppError::Config(format!("Invalid LOG_FORMAT: {}", other))),
    };

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      seed_db,
      admin_username,
      admin_email,
      admin_password,
      session_ttl_hours,
      log_format,
    })
  }

  pub fn server_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |k| map.get(k).cloned()
  }

  #[test]
  fn defaults_apply_when_only_database_url_is_set() {
    let cfg = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://localhost/dairyx")])).unwrap();
    assert_eq!(cfg.server_address(), "127.0.0.1:8080");
    assert_eq!(cfg.database_max_connections, 10);
    assert!(!cfg.seed_db);
    assert_eq!(cfg.admin_username, "admin");
    assert_eq!(cfg.admin_email, "admin@dairy-x.com");
    assert!(cfg.admin_password.is_none());
    assert_eq!(cfg.session_ttl_hours, 24);
    assert_eq!(cfg.log_format, LogFormat::Pretty);
  }

  #[test]
  fn missing_database_url_is_a_config_error() {
    let err = AppConfig::from_lookup(lookup_from(&[])).unwrap_err();
    assert!(matches!(err, AppError::Config(m) if m.contains("DATABASE_URL")));
  }

  #[test]
  fn rejects_invalid_port_and_bool() {
    let bad_port = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "x"), ("SERVER_PORT", "80800")]));
    assert!(matches!(bad_port, Err(AppError::Config(_))));

    let bad_seed = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "x"), ("SEED_DB", "yes")]));
    assert!(matches!(bad_seed, Err(AppError::Config(_))));

    let bad_format = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "x"), ("LOG_FORMAT", "xml")]));
    assert!(matches!(bad_format, Err(AppError::Config(_))));
  }
}
