//! Database schema management for `sensorhub`.
//!
//! Ensures the per-sensor-type tables exist before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::models::SensorType;

// ---

/// Create the database schema (idempotent).
///
/// One structurally identical table per sensor type. Safe to call on every
/// startup; no-op if the tables already exist.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    for sensor_type in SensorType::ALL {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id        INTEGER  PRIMARY KEY AUTOINCREMENT,
                value     REAL     NOT NULL,
                unit      TEXT     NOT NULL,
                timestamp DATETIME NOT NULL
            );
            "#,
            sensor_type.table()
        );
        sqlx::query(&ddl).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    Ok(())
}
