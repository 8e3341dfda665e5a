use chrono::{NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Tolerant cell parsers
// ---------------------------------------------------------------------------
//
// Every parser returns `None` on rejection; the loader attaches the row and
// column to the error.

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Drop surrounding whitespace and `,` thousands separators.
fn strip_grouping(s: &str) -> String {
    s.trim().chars().filter(|c| *c != ',').collect()
}

/// Parse an integer that may carry thousands separators (`"10,107"`).
///
/// A float with a zero fractional part (`"30.0"`) is accepted, as written by
/// tools that widen integer columns.
pub fn parse_integer(s: &str) -> Option<i64> {
    let cleaned = strip_grouping(s);
    if cleaned.is_empty() {
        return None;
    }
    if let Ok(i) = cleaned.parse::<i64>() {
        return Some(i);
    }
    let f = cleaned.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

/// Parse a non-negative count.
pub fn parse_quantity(s: &str) -> Option<u32> {
    parse_integer(s).and_then(|i| u32::try_from(i).ok())
}

/// Parse a finite, non-negative currency amount.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned = strip_grouping(s);
    let value = cleaned.parse::<f64>().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}

/// Parse a calendar date; a trailing time of day is discarded.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}
