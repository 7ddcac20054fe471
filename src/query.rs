//! List-query construction for the sensor tables.
//!
//! Pure SQL-text building: the table name and order column come from closed
//! enums, and every filter value is returned as a bound parameter, never
//! spliced into the statement text.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::SensorType;

// ---

/// Orderable columns. Anything else in the `order-by` query parameter is
/// silently ignored rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderBy {
    Value,
    Timestamp,
}

impl OrderBy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "value" => Some(OrderBy::Value),
            "timestamp" => Some(OrderBy::Timestamp),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            OrderBy::Value => "value",
            OrderBy::Timestamp => "timestamp",
        }
    }
}

/// A validated list query: sensor type plus optional inclusive timestamp
/// bounds and optional ordering.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub sensor_type: SensorType,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub order_by: Option<OrderBy>,
}

impl ListQuery {
    pub fn new(sensor_type: SensorType) -> Self {
        Self {
            sensor_type,
            start: None,
            end: None,
            order_by: None,
        }
    }

    /// Render the SELECT statement and the parameters to bind, in order.
    pub fn to_sql(&self) -> (String, Vec<NaiveDateTime>) {
        // ---
        let mut sql = format!(
            "SELECT id, value, unit, timestamp FROM {}",
            self.sensor_type.table()
        );
        let mut binds = Vec::new();

        let mut predicates = Vec::new();
        if let Some(start) = self.start {
            predicates.push("timestamp >= ?");
            binds.push(start);
        }
        if let Some(end) = self.end {
            predicates.push("timestamp <= ?");
            binds.push(end);
        }
        if !predicates.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }

        if let Some(order_by) = self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by.column());
        }

        (sql, binds)
    }
}

/// Parse a range bound from a query parameter.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, or a bare date. A
/// bare date expands to the start of that day, keeping the lower bound
/// inclusive.
pub fn parse_start_bound(raw: &str) -> Option<NaiveDateTime> {
    parse_bound(raw, false)
}

/// Like [`parse_start_bound`], but a bare date expands to the last second of
/// that day so the upper bound stays inclusive.
pub fn parse_end_bound(raw: &str) -> Option<NaiveDateTime> {
    parse_bound(raw, true)
}

fn parse_bound(raw: &str, end_of_day: bool) -> Option<NaiveDateTime> {
    // ---
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt);
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        (23, 59, 59)
    } else {
        (0, 0, 0)
    };
    date.and_hms_opt(time.0, time.1, time.2)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn bare_select_without_filters() {
        // ---
        let (sql, binds) = ListQuery::new(SensorType::Temperature).to_sql();
        assert_eq!(sql, "SELECT id, value, unit, timestamp FROM temperature");
        assert!(binds.is_empty());
    }

    #[test]
    fn range_filters_become_bound_parameters() {
        // ---
        let mut q = ListQuery::new(SensorType::Humidity);
        q.start = parse_start_bound("2024-01-01");
        q.end = parse_end_bound("2024-01-31");

        let (sql, binds) = q.to_sql();
        assert_eq!(
            sql,
            "SELECT id, value, unit, timestamp FROM humidity \
             WHERE timestamp >= ? AND timestamp <= ?"
        );
        assert_eq!(binds.len(), 2);
        assert_eq!(binds[0].to_string(), "2024-01-01 00:00:00");
        assert_eq!(binds[1].to_string(), "2024-01-31 23:59:59");
    }

    #[test]
    fn single_bound_uses_one_predicate() {
        // ---
        let mut q = ListQuery::new(SensorType::Light);
        q.start = parse_start_bound("2024-06-01 12:00:00");

        let (sql, binds) = q.to_sql();
        assert_eq!(
            sql,
            "SELECT id, value, unit, timestamp FROM light WHERE timestamp >= ?"
        );
        assert_eq!(binds.len(), 1);
    }

    #[test]
    fn ordering_appends_only_known_columns() {
        // ---
        let mut q = ListQuery::new(SensorType::Temperature);
        q.order_by = OrderBy::parse("value");
        let (sql, _) = q.to_sql();
        assert!(sql.ends_with("ORDER BY value"));

        q.order_by = OrderBy::parse("timestamp");
        let (sql, _) = q.to_sql();
        assert!(sql.ends_with("ORDER BY timestamp"));
    }

    #[test]
    fn unknown_order_by_is_silently_ignored() {
        // ---
        assert_eq!(OrderBy::parse("id"), None);
        assert_eq!(OrderBy::parse("value; DROP TABLE temperature"), None);

        let q = ListQuery::new(SensorType::Temperature);
        let (sql, _) = q.to_sql();
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn bound_parsing_accepts_dates_and_datetimes() {
        // ---
        assert_eq!(
            parse_start_bound("2024-03-21T08:15:00").unwrap().to_string(),
            "2024-03-21 08:15:00"
        );
        assert_eq!(
            parse_start_bound("2024-03-21 08:15:00").unwrap().to_string(),
            "2024-03-21 08:15:00"
        );
        assert_eq!(
            parse_end_bound("2024-03-21").unwrap().to_string(),
            "2024-03-21 23:59:59"
        );
        assert!(parse_start_bound("not-a-date").is_none());
        assert!(parse_end_bound("2024-13-99").is_none());
    }
}
