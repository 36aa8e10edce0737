use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate};

pub const DAY_FORMAT: &str = "%Y-%m-%d";

/// Parse a civil calendar day.
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp. For timestamps the date is
/// taken as written: the offset and time of day are dropped, never applied.
pub fn parse_day(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(day) = NaiveDate::parse_from_str(s, DAY_FORMAT) {
        return Ok(day);
    }
    let stamp = DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))?;
    Ok(stamp.date_naive())
}

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}
