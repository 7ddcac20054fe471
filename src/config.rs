//! Configuration loader for the `sensorhub` service.
//!
//! Centralizes all runtime configuration and defaults, loading from
//! environment variables (with optional `.env` support provided by the
//! caller). Keeping every `env::var` call here gives the rest of the code a
//! single immutable snapshot to work from.

use std::env;

use anyhow::{anyhow, Result};

/// Parse an optional integer environment variable with a default value.
macro_rules! parse_env_u32 {
    ($var_name:expr, $default:expr) => {
        env::var($var_name)
            .ok()
            .map(|v| v.parse::<u32>())
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

/// Strongly typed application configuration, immutable after loading.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// SQLite connection string.
    pub db_url: String,

    /// Maximum number of database connections in the pool.
    pub db_pool_max: u32,

    /// Port the HTTP API listens on.
    pub http_port: u16,

    /// Directory holding the per-sensor-type seed CSV files.
    pub seed_dir: String,

    /// MQTT broker hostname.
    pub mqtt_host: String,

    /// MQTT broker port.
    pub mqtt_port: u16,

    /// Topic root the relay subscribes under. When unset the relay is
    /// disabled entirely.
    pub topic_root: Option<String>,

    /// Endpoint the relay forwards readings to.
    pub ingest_url: String,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `DATABASE_URL` – SQLite connection string
///
/// Optional:
/// - `DB_POOL_MAX` – max DB connections (default: 5)
/// - `HTTP_PORT` – API listen port (default: 6543)
/// - `SEED_DIR` – seed CSV directory (default: `sample`)
/// - `MQTT_BROKER_HOST` – broker hostname (default: `broker.hivemq.com`)
/// - `MQTT_BROKER_PORT` – broker port (default: 1883)
/// - `SENSOR_TOPIC_ROOT` – relay topic root (relay disabled when unset)
/// - `INGEST_URL` – relay forward target
///   (default: `http://localhost:{HTTP_PORT}/api/temperature`)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    // ---
    let db_url = require_env!("DATABASE_URL");
    let db_pool_max = parse_env_u32!("DB_POOL_MAX", 5);
    let http_port = as_port("HTTP_PORT", parse_env_u32!("HTTP_PORT", 6543))?;
    let seed_dir = env::var("SEED_DIR").unwrap_or_else(|_| "sample".to_string());
    let mqtt_host =
        env::var("MQTT_BROKER_HOST").unwrap_or_else(|_| "broker.hivemq.com".to_string());
    let mqtt_port = as_port("MQTT_BROKER_PORT", parse_env_u32!("MQTT_BROKER_PORT", 1883))?;
    let topic_root = env::var("SENSOR_TOPIC_ROOT").ok().filter(|t| !t.is_empty());
    let ingest_url = env::var("INGEST_URL")
        .unwrap_or_else(|_| format!("http://localhost:{http_port}/api/temperature"));

    Ok(Config {
        db_url,
        db_pool_max,
        http_port,
        seed_dir,
        mqtt_host,
        mqtt_port,
        topic_root,
        ingest_url,
    })
}

fn as_port(var_name: &str, value: u32) -> Result<u16> {
    u16::try_from(value).map_err(|_| anyhow!("Invalid {}: {} is not a port", var_name, value))
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        tracing::info!("Configuration loaded:");
        tracing::info!("  DATABASE_URL      : {}", self.db_url);
        tracing::info!("  DB_POOL_MAX       : {}", self.db_pool_max);
        tracing::info!("  HTTP_PORT         : {}", self.http_port);
        tracing::info!("  SEED_DIR          : {}", self.seed_dir);
        tracing::info!("  MQTT_BROKER_HOST  : {}", self.mqtt_host);
        tracing::info!("  MQTT_BROKER_PORT  : {}", self.mqtt_port);
        tracing::info!(
            "  SENSOR_TOPIC_ROOT : {}",
            self.topic_root.as_deref().unwrap_or("(unset, relay off)")
        );
        tracing::info!("  INGEST_URL        : {}", self.ingest_url);
    }
}
