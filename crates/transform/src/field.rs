//! Lenient scalar access into raw provider rows.
//!
//! Providers disagree on types: TheSportsDB sends every number as a string,
//! football-data.org sends ids as numbers, API-Football mixes both. These
//! helpers take a JSON pointer (`/team/id`) and accept either form. Empty
//! strings and `null` read as absent.

use chrono::{DateTime, NaiveDate, NaiveTime};
use serde_json::Value;

fn at<'a>(row: &'a Value, pointer: &str) -> Option<&'a Value> {
    row.pointer(pointer).filter(|v| !v.is_null())
}

/// Integer from a number or numeric string. Whole floats (`"3.0"`) are accepted.
#[must_use]
pub fn int(row: &Value, pointer: &str) -> Option<i64> {
    match at(row, pointer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// Non-empty trimmed text; numbers are rendered as text.
#[must_use]
pub fn text(row: &Value, pointer: &str) -> Option<String> {
    match at(row, pointer)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-empty text among several pointers.
#[must_use]
pub fn text_any(row: &Value, pointers: &[&str]) -> Option<String> {
    pointers.iter().find_map(|p| text(row, p))
}

/// Calendar date from `YYYY-MM-DD` or the date part of an RFC 3339 timestamp.
#[must_use]
pub fn date(row: &Value, pointer: &str) -> Option<NaiveDate> {
    let raw = text(row, pointer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Some(ts.naive_utc().date());
    }
    NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok()
}

/// Time of day from `HH:MM[:SS]`, ignoring a trailing offset.
#[must_use]
pub fn time(row: &Value, pointer: &str) -> Option<NaiveTime> {
    let raw = text(row, pointer)?;
    let parse = |len: usize, fmt: &str| {
        raw.get(..len)
            .and_then(|clock| NaiveTime::parse_from_str(clock, fmt).ok())
    };
    parse(8, "%H:%M:%S").or_else(|| parse(5, "%H:%M"))
}

/// Date and UTC time of day from an RFC 3339 timestamp.
#[must_use]
pub fn timestamp(row: &Value, pointer: &str) -> (Option<NaiveDate>, Option<NaiveTime>) {
    match text(row, pointer).map(|raw| DateTime::parse_from_rfc3339(&raw)) {
        Some(Ok(ts)) => {
            let utc = ts.naive_utc();
            (Some(utc.date()), Some(utc.time()))
        }
        _ => (date(row, pointer), None),
    }
}
