//! Configuration loader for the `occupancy-monitor` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Everything else in the crate receives a [`Config`]
//! instead of reading the environment directly.
//!
use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional numeric environment variable with a default value.
macro_rules! parse_env {
    ($var_name:expr, $ty:ty, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($var_name:expr) => {
        env::var($var_name)
            .map_err(|_| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

pub const DEFAULT_MODEL_PATH: &str = "models/occupancy.json";

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// PostgreSQL connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Path to the pretrained classifier artifact.
    pub model_path: String,

    /// TCP port the HTTP server listens on.
    pub port: u16,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – PostgreSQL connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `MODEL_PATH` – classifier artifact (default: `models/occupancy.json`)
/// - `PORT` – listen port (default: 5000)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env!("DB_POOL_MAX", u32, 5);
    let port = parse_env!("PORT", u16, 5000);
    let model_path = env::var("MODEL_PATH").unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string());

    Ok(Config {
        db_url,
        db_pool_max,
        model_path,
        port,
    })
}

impl Config {
    /// URL of the query endpoint the dashboard poller reads from.
    pub fn dashboard_source_url(&self) -> String {
        format!("http://localhost:{}/dados", self.port)
    }

    /// Database URL with the password replaced by `****`.
    pub fn masked_db_url(&self) -> String {
        // ---
        if let Some(at_pos) = self.db_url.rfind('@') {
            if let Some(colon_pos) = self.db_url[..at_pos].rfind(':') {
                return format!(
                    "{}:****{}",
                    &self.db_url[..colon_pos],
                    &self.db_url[at_pos..]
                );
            }
        }
        self.db_url.clone()
    }

    /// Log the loaded configuration, masking the database password.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL : {}", self.masked_db_url());
        tracing::info!("  DB_POOL_MAX  : {}", self.db_pool_max);
        tracing::info!("  MODEL_PATH   : {}", self.model_path);
        tracing::info!("  PORT         : {}", self.port);
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn config_with_url(db_url: &str) -> Config {
        Config {
            db_url: db_url.to_string(),
            db_pool_max: 5,
            model_path: DEFAULT_MODEL_PATH.to_string(),
            port: 5000,
        }
    }

    #[test]
    fn test_password_is_masked() {
        // ---
        let cfg = config_with_url("postgres://app:secret@db:5432/occupancy");
        assert_eq!(cfg.masked_db_url(), "postgres://app:****@db:5432/occupancy");
    }

    #[test]
    fn test_url_without_credentials_is_unchanged() {
        // ---
        let cfg = config_with_url("postgres://localhost/occupancy");
        assert_eq!(cfg.masked_db_url(), "postgres://localhost/occupancy");
    }

    #[test]
    fn test_dashboard_source_follows_port() {
        // ---
        let mut cfg = config_with_url("postgres://localhost/occupancy");
        cfg.port = 8081;
        assert_eq!(cfg.dashboard_source_url(), "http://localhost:8081/dados");
    }
}
