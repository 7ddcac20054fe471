//! Seed loader: populates the sensor tables from bundled CSV files.
//!
//! One file per sensor type (`<seed_dir>/<type>.csv`), columns
//! `timestamp,value,unit` with a single header row. Runs once at startup and
//! skips any table that already holds rows, so restarts do not duplicate
//! data. The bundled files contain no quoting, so plain line splitting is
//! enough.

use std::path::Path;

use anyhow::Result;
use tracing::{info, warn};

use crate::models::{ReadingBody, SensorType};
use crate::query::parse_start_bound;
use crate::service::SensorService;

// ---

/// Seed every empty sensor table from its CSV file.
///
/// A missing file or directory is logged and skipped rather than treated as
/// fatal; the service is usable without sample data.
pub async fn seed_database(service: &SensorService, seed_dir: &str) -> Result<()> {
    // ---
    for sensor_type in SensorType::ALL {
        if service.count(sensor_type).await? > 0 {
            info!("table {} already seeded, skipping", sensor_type.table());
            continue;
        }

        let path = Path::new(seed_dir).join(format!("{}.csv", sensor_type.table()));
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("no seed data for {} ({}): {e}", sensor_type.table(), path.display());
                continue;
            }
        };

        let mut loaded = 0usize;
        for (line_no, line) in contents.lines().enumerate().skip(1) {
            match parse_line(line) {
                Some(reading) => {
                    service.insert(sensor_type, &reading).await?;
                    loaded += 1;
                }
                None => {
                    if !line.trim().is_empty() {
                        warn!(
                            "skipping malformed seed row {}:{}",
                            path.display(),
                            line_no + 1
                        );
                    }
                }
            }
        }
        info!("seeded {} rows into {}", loaded, sensor_type.table());
    }
    Ok(())
}

/// Parse one `timestamp,value,unit` row.
fn parse_line(line: &str) -> Option<ReadingBody> {
    // ---
    let mut fields = line.split(',');
    let timestamp = parse_start_bound(fields.next()?.trim())?;
    let value: f64 = fields.next()?.trim().parse().ok()?;
    let unit = fields.next()?.trim();
    if unit.is_empty() || fields.next().is_some() {
        return None;
    }
    Some(ReadingBody {
        value,
        unit: unit.to_string(),
        timestamp: Some(timestamp),
    })
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use crate::schema::create_schema;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn parses_a_well_formed_row() {
        // ---
        let reading = parse_line("2024-01-15 10:30:00,23.5,C").unwrap();
        assert_eq!(reading.value, 23.5);
        assert_eq!(reading.unit, "C");
        assert_eq!(
            reading.timestamp.unwrap().to_string(),
            "2024-01-15 10:30:00"
        );
    }

    #[test]
    fn rejects_malformed_rows() {
        // ---
        assert!(parse_line("timestamp,value,unit").is_none()); // header
        assert!(parse_line("2024-01-15 10:30:00,not-a-number,C").is_none());
        assert!(parse_line("2024-01-15 10:30:00,23.5").is_none()); // missing unit
        assert!(parse_line("2024-01-15 10:30:00,23.5,C,extra").is_none());
        assert!(parse_line("").is_none());
    }

    #[tokio::test]
    async fn seeds_once_and_stays_idempotent() {
        // ---
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        create_schema(&pool).await.unwrap();
        let service = SensorService::new(pool);

        let dir = std::env::temp_dir().join(format!("sensorhub-seed-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("temperature.csv"),
            "timestamp,value,unit\n\
             2024-01-01 00:00:00,20.0,C\n\
             2024-01-02 00:00:00,21.0,C\n",
        )
        .unwrap();

        let seed_dir = dir.to_str().unwrap();
        seed_database(&service, seed_dir).await.unwrap();
        assert_eq!(service.count(SensorType::Temperature).await.unwrap(), 2);
        // Missing humidity/light files are skipped, not fatal.
        assert_eq!(service.count(SensorType::Humidity).await.unwrap(), 0);

        // Second run must not duplicate rows.
        seed_database(&service, seed_dir).await.unwrap();
        assert_eq!(service.count(SensorType::Temperature).await.unwrap(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
