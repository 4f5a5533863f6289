//! In-memory ticker cache.
//!
//! product id -> day key -> candle. Entries are only ever added or
//! overwritten; the whole document is persisted through a
//! [`TickerStorePort`](crate::ports::store_port::TickerStorePort).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::ohlcv::{day_key, Candle};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TickerCache {
    entries: HashMap<String, HashMap<String, Candle>>,
}

impl TickerCache {
    pub fn new() -> Self {
        TickerCache::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn insert(&mut self, product_id: &str, day: DateTime<Utc>, candle: Candle) {
        self.entries
            .entry(product_id.to_string())
            .or_default()
            .insert(day_key(day), candle);
    }

    pub fn candle_at(&self, product_id: &str, day: DateTime<Utc>) -> Option<&Candle> {
        self.entries.get(product_id)?.get(&day_key(day))
    }

    /// Shallow coverage check: both boundary days present. Intermediate days
    /// are not verified.
    pub fn covers(&self, product_id: &str, begin: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        match self.entries.get(product_id) {
            Some(days) => days.contains_key(&day_key(begin)) && days.contains_key(&day_key(end)),
            None => false,
        }
    }

    /// Closing price of the most recent cached day for a product.
    pub fn latest_close(&self, product_id: &str) -> Option<f64> {
        let days = self.entries.get(product_id)?;
        days.iter()
            .filter_map(|(key, candle)| key.parse::<i64>().ok().map(|ts| (ts, candle)))
            .max_by_key(|(ts, _)| *ts)
            .map(|(_, candle)| candle.close)
    }

    pub fn day_count(&self, product_id: &str) -> usize {
        self.entries.get(product_id).map_or(0, |days| days.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(close: f64, volume: f64) -> Candle {
        Candle {
            low: close - 1.0,
            high: close + 1.0,
            open: close,
            close,
            volume,
        }
    }

    fn day(n: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(n * 86_400, 0).unwrap()
    }

    #[test]
    fn insert_and_lookup() {
        let mut cache = TickerCache::new();
        cache.insert("BTC-EUR", day(19_000), candle(100.0, 5.0));

        assert_eq!(cache.candle_at("BTC-EUR", day(19_000)).unwrap().close, 100.0);
        assert!(cache.candle_at("BTC-EUR", day(19_001)).is_none());
        assert!(cache.candle_at("ETH-EUR", day(19_000)).is_none());
    }

    #[test]
    fn insert_overwrites_same_day() {
        let mut cache = TickerCache::new();
        cache.insert("BTC-EUR", day(19_000), candle(100.0, 5.0));
        cache.insert("BTC-EUR", day(19_000), candle(200.0, 5.0));

        assert_eq!(cache.candle_at("BTC-EUR", day(19_000)).unwrap().close, 200.0);
        assert_eq!(cache.day_count("BTC-EUR"), 1);
    }

    #[test]
    fn covers_checks_only_boundaries() {
        let mut cache = TickerCache::new();
        cache.insert("BTC-EUR", day(19_000), candle(100.0, 5.0));
        cache.insert("BTC-EUR", day(19_010), candle(110.0, 5.0));

        // intermediate days are missing but the boundaries satisfy the check
        assert!(cache.covers("BTC-EUR", day(19_000), day(19_010)));
        assert!(!cache.covers("BTC-EUR", day(19_000), day(19_011)));
        assert!(!cache.covers("ETH-EUR", day(19_000), day(19_010)));
    }

    #[test]
    fn latest_close_picks_most_recent_day() {
        let mut cache = TickerCache::new();
        cache.insert("BTC-EUR", day(19_005), candle(105.0, 5.0));
        cache.insert("BTC-EUR", day(19_010), candle(110.0, 5.0));
        cache.insert("BTC-EUR", day(19_001), candle(101.0, 5.0));

        assert_eq!(cache.latest_close("BTC-EUR"), Some(110.0));
        assert_eq!(cache.latest_close("ETH-EUR"), None);
    }

    #[test]
    fn serializes_as_plain_json_object() {
        let mut cache = TickerCache::new();
        cache.insert("BTC-EUR", day(19_000), candle(100.0, 5.0));

        let text = serde_json::to_string(&cache).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let stored = &value["BTC-EUR"][(19_000_i64 * 86_400).to_string()];
        assert_eq!(stored["close"], 100.0);

        let back: TickerCache = serde_json::from_str(&text).unwrap();
        assert_eq!(back, cache);
    }
}
