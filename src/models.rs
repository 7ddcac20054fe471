//! Data models for the sensor hub.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ---

/// The closed set of sensor types the service stores.
///
/// Each variant maps to its own storage table; the type itself is never
/// stored in a row, it only routes a request to the right table. Any path
/// segment outside this set is rejected before a database connection is
/// touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorType {
    Temperature,
    Humidity,
    Light,
}

impl SensorType {
    pub const ALL: [SensorType; 3] = [
        SensorType::Temperature,
        SensorType::Humidity,
        SensorType::Light,
    ];

    /// Parse a URL path segment. Returns `None` for anything outside the
    /// fixed set.
    pub fn parse(segment: &str) -> Option<Self> {
        match segment {
            "temperature" => Some(SensorType::Temperature),
            "humidity" => Some(SensorType::Humidity),
            "light" => Some(SensorType::Light),
            _ => None,
        }
    }

    /// Name of the backing table. Only ever one of three fixed strings, so
    /// it is safe to splice into SQL text.
    pub fn table(&self) -> &'static str {
        match self {
            SensorType::Temperature => "temperature",
            SensorType::Humidity => "humidity",
            SensorType::Light => "light",
        }
    }
}

/// One stored measurement row.
///
/// Timestamps are naive date-times: callers supply them verbatim and they
/// are stored and returned without timezone normalization.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SensorRecord {
    // ---
    pub id: i64,
    pub value: f64,
    pub unit: String,
    pub timestamp: NaiveDateTime,
}

/// Request body for POST and PUT.
///
/// When `timestamp` is omitted the service assigns the current local time at
/// insert/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingBody {
    // ---
    pub value: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
}
