//! Data consistency checks for the flight_reservation schema
//!
//! Each check is a read-only query whose result rows are violations. The
//! schema contract is the lab's: `Flight` (flight_id, departure_time,
//! arrival_time), `Booking` (booking_id, flight_id, passenger_id) and
//! `Reserve` (booking_id, seat). Checks never modify data.

use crate::report::{CheckOutcome, CheckReport};
use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use sqlx::mysql::{MySqlPool, MySqlRow};
use sqlx::{Column, Row, ValueRef};
use std::time::Instant;
use tracing::info;

/// One read-only consistency check
pub struct ConsistencyCheck {
    pub name: &'static str,
    pub description: &'static str,
    pub sql: &'static str,
}

/// The built-in checks, in execution order
pub fn builtin_checks() -> &'static [ConsistencyCheck] {
    &BUILTIN
}

static BUILTIN: [ConsistencyCheck; 4] = [
    ConsistencyCheck {
        name: "duplicate_seats",
        description: "same seat reserved more than once on one flight",
        sql: "\
SELECT f.flight_id, r.seat, COUNT(*) as duplicates
FROM Flight f
JOIN Booking b ON f.flight_id = b.flight_id
JOIN Reserve r ON b.booking_id = r.booking_id
GROUP BY f.flight_id, r.seat
HAVING duplicates > 1",
    },
    ConsistencyCheck {
        name: "overlapping_itineraries",
        description: "passenger booked on two flights that overlap in time",
        sql: "\
SELECT b1.passenger_id,
       b1.booking_id AS booking_a, b2.booking_id AS booking_b,
       f1.flight_id AS flight_a, f1.departure_time AS departure_a,
       f2.flight_id AS flight_b, f2.departure_time AS departure_b
FROM Booking b1
JOIN Booking b2 ON b1.passenger_id = b2.passenger_id
               AND b1.booking_id < b2.booking_id
JOIN Flight f1 ON b1.flight_id = f1.flight_id
JOIN Flight f2 ON b2.flight_id = f2.flight_id
WHERE f1.flight_id <> f2.flight_id
  AND f1.departure_time < f2.arrival_time
  AND f2.departure_time < f1.arrival_time",
    },
    ConsistencyCheck {
        name: "orphaned_reservations",
        description: "seat reservation whose booking does not exist",
        sql: "\
SELECT r.booking_id, r.seat
FROM Reserve r
LEFT JOIN Booking b ON r.booking_id = b.booking_id
WHERE b.booking_id IS NULL",
    },
    ConsistencyCheck {
        name: "orphaned_bookings",
        description: "booking whose flight does not exist",
        sql: "\
SELECT b.booking_id, b.flight_id, b.passenger_id
FROM Booking b
LEFT JOIN Flight f ON b.flight_id = f.flight_id
WHERE f.flight_id IS NULL",
    },
];

/// Run every built-in check, timing each one. Violation rows beyond
/// `sample_limit` are counted but not kept.
pub async fn run_checks(
    pool: &MySqlPool,
    database: &str,
    sample_limit: usize,
) -> Result<CheckReport> {
    let mut report = CheckReport::new(database);
    for check in builtin_checks() {
        let started = Instant::now();
        let rows = sqlx::query(check.sql)
            .fetch_all(pool)
            .await
            .with_context(|| format!("Consistency check '{}' failed", check.name))?;
        let elapsed_seconds = started.elapsed().as_secs_f64();

        info!(
            check = check.name,
            violations = rows.len(),
            elapsed_seconds = format!("{:.2}", elapsed_seconds).as_str(),
            "Check finished"
        );
        report.checks.push(CheckOutcome {
            name: check.name.to_string(),
            description: check.description.to_string(),
            violations: rows.len() as u64,
            elapsed_seconds,
            sample: rows.iter().take(sample_limit).map(row_to_json).collect(),
        });
    }
    Ok(report)
}

/// Render a violation row as a JSON object, column name to value
fn row_to_json(row: &MySqlRow) -> Value {
    let mut object = Map::new();
    for (idx, column) in row.columns().iter().enumerate() {
        object.insert(column.name().to_string(), column_to_json(row, idx));
    }
    Value::Object(object)
}

fn column_to_json(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(raw) = row.try_get_raw(idx) {
        if raw.is_null() {
            return Value::Null;
        }
    }
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return json!(v);
    }
    if let Ok(v) = row.try_get::<u64, _>(idx) {
        return json!(v);
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return json!(v);
    }
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return json!(v);
    }
    if let Ok(v) = row.try_get::<chrono::NaiveDateTime, _>(idx) {
        return json!(v.format("%Y-%m-%d %H:%M:%S").to_string());
    }
    if let Ok(v) = row.try_get::<chrono::DateTime<chrono::Utc>, _>(idx) {
        return json!(v.to_rfc3339());
    }
    if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
        return json!(flightdb_common::db::hex_literal(&v));
    }
    Value::Null
}
