//! Daily OHLCV records and day-boundary helpers.
//!
//! Cache entries are keyed by the string-encoded Unix timestamp of UTC
//! midnight, so every date passed around the engine is truncated first.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// One calendar day of price and volume history for a single product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub low: f64,
    pub high: f64,
    pub open: f64,
    pub close: f64,
    pub volume: f64,
}

/// Truncate a timestamp to UTC midnight of the same day.
pub fn day_start(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Cache key for the day containing `at`.
pub fn day_key(at: DateTime<Utc>) -> String {
    day_start(at).timestamp().to_string()
}

/// Convert one raw exchange row `[time, low, high, open, close, volume]`
/// into a day-truncated candle. Returns `None` for anything malformed.
pub fn parse_row(row: &serde_json::Value) -> Option<(DateTime<Utc>, Candle)> {
    let fields = row.as_array()?;
    if fields.len() < 6 {
        return None;
    }
    let at = DateTime::from_timestamp(fields[0].as_i64()?, 0)?;
    let candle = Candle {
        low: fields[1].as_f64()?,
        high: fields[2].as_f64()?,
        open: fields[3].as_f64()?,
        close: fields[4].as_f64()?,
        volume: fields[5].as_f64()?,
    };
    Some((day_start(at), candle))
}
