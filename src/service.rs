//! Sensor record service: validated CRUD and query operations.
//!
//! The service owns nothing but an injected connection pool, so tests can
//! hand it an in-memory database. Every mutating operation commits
//! immediately; there is no batching and no transaction spanning calls.

use chrono::Local;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::Error;
use crate::models::{ReadingBody, SensorRecord, SensorType};
use crate::query::ListQuery;

// ---

/// Data-access layer for the three sensor tables.
#[derive(Clone)]
pub struct SensorService {
    pool: SqlitePool,
}

impl SensorService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// List records matching the query, empty if none match. Order is
    /// insertion order unless the query names an order column.
    pub async fn list(&self, query: &ListQuery) -> Result<Vec<SensorRecord>, Error> {
        // ---
        let (sql, binds) = query.to_sql();
        debug!(%sql, "listing {} records", query.sensor_type.table());

        let mut stmt = sqlx::query_as::<_, SensorRecord>(&sql);
        for bind in binds {
            stmt = stmt.bind(bind);
        }
        Ok(stmt.fetch_all(&self.pool).await?)
    }

    /// Fetch a single record by id.
    pub async fn get(&self, sensor_type: SensorType, id: i64) -> Result<SensorRecord, Error> {
        // ---
        let sql = format!(
            "SELECT id, value, unit, timestamp FROM {} WHERE id = ?",
            sensor_type.table()
        );
        sqlx::query_as::<_, SensorRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NotFound)
    }

    /// Insert a new record and return its assigned id. A missing timestamp
    /// defaults to the current local time.
    pub async fn insert(
        &self,
        sensor_type: SensorType,
        reading: &ReadingBody,
    ) -> Result<i64, Error> {
        // ---
        let timestamp = reading
            .timestamp
            .unwrap_or_else(|| Local::now().naive_local());
        let sql = format!(
            "INSERT INTO {} (value, unit, timestamp) VALUES (?, ?, ?)",
            sensor_type.table()
        );
        let result = sqlx::query(&sql)
            .bind(reading.value)
            .bind(&reading.unit)
            .bind(timestamp)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!(id, "inserted {} record", sensor_type.table());
        Ok(id)
    }

    /// Replace value, unit, and timestamp of an existing record. The id is
    /// immutable. A single UPDATE checked through `rows_affected` avoids the
    /// check-then-act race a SELECT-first approach would have.
    pub async fn update(
        &self,
        sensor_type: SensorType,
        id: i64,
        reading: &ReadingBody,
    ) -> Result<(), Error> {
        // ---
        let timestamp = reading
            .timestamp
            .unwrap_or_else(|| Local::now().naive_local());
        let sql = format!(
            "UPDATE {} SET value = ?, unit = ?, timestamp = ? WHERE id = ?",
            sensor_type.table()
        );
        let result = sqlx::query(&sql)
            .bind(reading.value)
            .bind(&reading.unit)
            .bind(timestamp)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Delete a record by id. Deleting an absent id fails with `NotFound`,
    /// so a repeated delete fails the same way instead of crashing.
    pub async fn delete(&self, sensor_type: SensorType, id: i64) -> Result<(), Error> {
        // ---
        let sql = format!("DELETE FROM {} WHERE id = ?", sensor_type.table());
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    /// Count all rows for a sensor type.
    pub async fn count(&self, sensor_type: SensorType) -> Result<i64, Error> {
        // ---
        let sql = format!("SELECT COUNT(*) FROM {}", sensor_type.table());
        Ok(sqlx::query_scalar(&sql).fetch_one(&self.pool).await?)
    }
}
