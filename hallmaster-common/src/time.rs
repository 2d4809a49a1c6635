//! Timestamp utilities for the Hallmaster wire format
//!
//! The scheduler API takes range bounds as second-precision timestamps with a
//! literal `+00:00` suffix, whatever the caller's zone. Callers must pass
//! UTC-equivalent instants.

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Format used for `start`/`end` query parameters
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+00:00";

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a range bound for the booking source (fractional seconds dropped)
pub fn format_wire_time(time: &DateTime<Utc>) -> String {
    time.format(WIRE_TIME_FORMAT).to_string()
}

/// Parse a booking entry timestamp
///
/// Accepts RFC 3339 (any offset, converted to UTC) or a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` taken to be UTC.
pub fn parse_entry_time(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(time) = DateTime::parse_from_rfc3339(value) {
        return Ok(time.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|e| Error::Validation(format!("Invalid timestamp '{}': {}", value, e)))
}

/// Parse a user-supplied date: `YYYY-MM-DD` (midnight UTC) or RFC 3339
pub fn parse_user_date(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| Error::Validation(format!("Invalid date '{}'", value)))?;
        return Ok(Utc.from_utc_datetime(&midnight));
    }

    parse_entry_time(value)
}
