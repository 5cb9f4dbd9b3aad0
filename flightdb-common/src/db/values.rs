//! SQL literal rendering for dump export
//!
//! Values read back through the binary protocol are rendered as literals the
//! mysql client parses back to the same value. Rendering is driven by the
//! column type reported by the server, with a try-decode ladder as fallback
//! for types outside the common set.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::mysql::MySqlRow;
use sqlx::{Row, TypeInfo, ValueRef};

/// Render one column of a row as a SQL literal
pub fn sql_literal(row: &MySqlRow, idx: usize) -> Result<String> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok("NULL".to_string());
    }
    let type_name = raw.type_info().name().to_string();

    let rendered = match type_name.as_str() {
        "BOOLEAN" => row
            .try_get::<bool, _>(idx)
            .map(|b| if b { "1" } else { "0" }.to_string()),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            row.try_get::<i64, _>(idx).map(|v| v.to_string())
        }
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED"
        | "BIGINT UNSIGNED" | "YEAR" | "BIT" => {
            row.try_get::<u64, _>(idx).map(|v| v.to_string())
        }
        "FLOAT" => row.try_get::<f32, _>(idx).map(|v| v.to_string()),
        "DOUBLE" => row.try_get::<f64, _>(idx).map(|v| v.to_string()),
        "DECIMAL" => row.try_get::<Decimal, _>(idx).map(|v| v.to_string()),
        "DATE" => row
            .try_get::<NaiveDate, _>(idx)
            .map(|v| format!("'{}'", v.format("%Y-%m-%d"))),
        "TIME" => row
            .try_get::<NaiveTime, _>(idx)
            .map(|v| format!("'{}'", v.format("%H:%M:%S%.f"))),
        "DATETIME" => row
            .try_get::<NaiveDateTime, _>(idx)
            .map(|v| format!("'{}'", v.format("%Y-%m-%d %H:%M:%S%.f"))),
        "TIMESTAMP" => row
            .try_get::<DateTime<Utc>, _>(idx)
            .map(|v| format!("'{}'", v.naive_utc().format("%Y-%m-%d %H:%M:%S%.f"))),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
        | "GEOMETRY" => row.try_get::<Vec<u8>, _>(idx).map(|v| hex_literal(&v)),
        _ => row
            .try_get::<String, _>(idx)
            .map(|v| quoted(&v)),
    };

    match rendered {
        Ok(literal) => Ok(literal),
        Err(_) => fallback_literal(row, idx, &type_name),
    }
}

/// Try-decode ladder for values whose reported type did not decode as
/// expected
fn fallback_literal(row: &MySqlRow, idx: usize, type_name: &str) -> Result<String> {
    if let Ok(v) = row.try_get::<String, _>(idx) {
        return Ok(quoted(&v));
    }
    if let Ok(v) = row.try_get::<i64, _>(idx) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<u64, _>(idx) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<f64, _>(idx) {
        return Ok(v.to_string());
    }
    if let Ok(v) = row.try_get::<Vec<u8>, _>(idx) {
        return Ok(hex_literal(&v));
    }
    Err(Error::Internal(format!(
        "Cannot render value of column type {} at index {}",
        type_name, idx
    )))
}

/// Quote and escape a string value
pub fn quoted(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

/// Escape a string for inclusion in a single-quoted SQL literal.
///
/// Matches what the server unescapes: backslash, quote, NUL, newline,
/// carriage return and ctrl-Z are written as backslash escapes.
pub fn escape_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\u{0}' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            _ => out.push(c),
        }
    }
    out
}

/// Render binary data as a hex literal (`''` when empty; `0x` takes no
/// digits)
pub fn hex_literal(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "''".to_string();
    }
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{:02X}", b));
    }
    out
}

/// Backtick-quote an identifier (backticks doubled)
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}
