use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;

/// Parsed CF-style time units, e.g. `"seconds since 1999-07-16 00:00:00"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeUnits {
    /// Multiply a stored time value by this to get minutes
    pub minutes_per_unit: f64,
    /// Reference instant, when the units string carries one
    pub origin: Option<NaiveDateTime>,
}

impl Default for TimeUnits {
    /// Model output without a units attribute is in seconds
    fn default() -> Self {
        Self {
            minutes_per_unit: 1.0 / 60.0,
            origin: None,
        }
    }
}

impl fmt::Display for TimeUnits {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.origin {
            Some(origin) => write!(f, "x{} min since {}", self.minutes_per_unit, origin),
            None => write!(f, "x{} min", self.minutes_per_unit),
        }
    }
}

/// Minutes in one unit of the given name
pub fn minutes_per_unit(unit: &str) -> Option<f64> {
    match unit.trim().to_ascii_lowercase().as_str() {
        "s" | "sec" | "secs" | "second" | "seconds" => Some(1.0 / 60.0),
        "min" | "mins" | "minute" | "minutes" => Some(1.0),
        "h" | "hr" | "hrs" | "hour" | "hours" => Some(60.0),
        "d" | "day" | "days" => Some(1440.0),
        _ => None,
    }
}

/// Parse a units attribute such as `"days since 2000-01-01"`
pub fn parse_time_units(units: &str) -> Result<TimeUnits, String> {
    let mut parts = units.splitn(2, " since ");
    let unit = parts.next().unwrap_or_default();
    let scale = minutes_per_unit(unit).ok_or_else(|| format!("Unknown time unit: {}", unit))?;
    let origin = match parts.next() {
        Some(origin) => Some(parse_origin(origin.trim())?),
        None => None,
    };

    Ok(TimeUnits {
        minutes_per_unit: scale,
        origin,
    })
}

/// Parse the reference instant of a units string
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS.f`
/// and a bare `YYYY-MM-DD`.
fn parse_origin(origin: &str) -> Result<NaiveDateTime, String> {
    const FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(origin, format) {
            return Ok(dt);
        }
    }

    // Some writers append a zone, keep only the date part then
    let date_part = origin.split_whitespace().next().unwrap_or(origin);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("Invalid time origin: {}", origin))
}

/// Convert stored time values to minutes
pub fn to_minutes(values: &[f64], units: &TimeUnits) -> Vec<f64> {
    values.iter().map(|v| v * units.minutes_per_unit).collect()
}
