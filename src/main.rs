//! Application entry point for the `sensorhub` service.
//!
//! Startup sequence:
//! - Initialize structured logging/tracing
//! - Load configuration from environment variables or `.env`
//! - Establish the SQLite connection pool
//! - Create the per-sensor-type tables if they do not exist
//! - Seed empty tables from the bundled sample CSVs
//! - Spawn the MQTT relay task (when a topic root is configured)
//! - Bind the Axum HTTP server and serve requests
//!
//! # Environment Variables
//! - `DATABASE_URL` (**required**) – SQLite connection string
//! - `DB_POOL_MAX`, `HTTP_PORT`, `SEED_DIR` – see `config.rs`
//! - `MQTT_BROKER_HOST`, `MQTT_BROKER_PORT`, `SENSOR_TOPIC_ROOT`,
//!   `INGEST_URL` – relay settings; the relay stays off without a topic root
//! - `RUST_LOG` / `LOG_LEVEL` – log verbosity (default: `info`)

use std::str::FromStr;
use std::time::Duration;
use std::{env, net::SocketAddr};

use anyhow::Result;
use axum::Router;
use dotenvy::dotenv;
use is_terminal::IsTerminal;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing_subscriber::filter::EnvFilter;

use sensorhub::relay::{HttpForwarder, RelaySettings};
use sensorhub::{config, relay, routes, schema, seed, SensorService};

// ---

#[tokio::main]
async fn main() -> Result<()> {
    // ---
    init_tracing();
    dotenv().ok();

    let cfg = config::load_from_env()?;
    cfg.log_config();

    tracing::info!("Attempting to connect to database: {}", cfg.db_url);

    // Storage calls are bounded: 5s to acquire a connection, 5s on a locked
    // database.
    let connect_options = SqliteConnectOptions::from_str(&cfg.db_url)
        .map_err(|e| anyhow::anyhow!("Invalid DATABASE_URL '{}': {}", cfg.db_url, e))?
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(cfg.db_pool_max)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(connect_options)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database '{}': {}", cfg.db_url, e))?;

    tracing::info!("Successfully connected to database");

    schema::create_schema(&pool).await?;

    let service = SensorService::new(pool);
    seed::seed_database(&service, &cfg.seed_dir).await?;

    if let Some(topic_root) = cfg.topic_root.clone() {
        let settings = RelaySettings {
            host: cfg.mqtt_host.clone(),
            port: cfg.mqtt_port,
            topic_root,
        };
        let forwarder = HttpForwarder::new(cfg.ingest_url.clone());
        tokio::spawn(relay::run(settings, forwarder));
    } else {
        tracing::info!("SENSOR_TOPIC_ROOT not set, message relay disabled");
    }

    let app: Router = routes::router(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.http_port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ---

/// Initialize the global tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence; otherwise `LOG_LEVEL` sets a base level
/// (default `info`) with sqlx query logging capped at `warn`. ANSI colors
/// only when stdout is a terminal.
fn init_tracing() {
    // ---
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        EnvFilter::new(format!("{level},sqlx::query=warn"))
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_ansi(std::io::stdout().is_terminal())
        .compact()
        .init();
}
