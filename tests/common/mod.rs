#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use cryptodca::domain::cache::TickerCache;
use cryptodca::domain::error::EngineError;
use cryptodca::domain::product::{Product, ProductInfo};
use cryptodca::ports::exchange_port::{AccountInfo, ExchangePort, OrderReceipt};
use cryptodca::ports::market_cap_port::{MarketCapEntry, MarketCapPort};
use cryptodca::ports::pacer_port::Pacer;
use cryptodca::ports::store_port::{RotationStatePort, TickerStorePort};

/// Midnight UTC of day `n` since the epoch.
pub fn day(n: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(n * 86_400, 0).unwrap()
}

/// Today as a day number, aligned with the engine's UTC midnight truncation.
pub fn today() -> i64 {
    Utc::now().timestamp().div_euclid(86_400)
}

/// A raw exchange row `[time, low, high, open, close, volume]` for day `n`.
pub fn raw_row(n: i64, close: f64, volume: f64) -> serde_json::Value {
    json!([n * 86_400, close - 2.0, close + 2.0, close - 1.0, close, volume])
}

pub fn product_info(base: &str, min_market_funds: f64, quote_increment: f64) -> ProductInfo {
    ProductInfo::new(Product::new(base, "EUR"), min_market_funds, quote_increment)
}

pub struct MockExchange {
    pub products: Vec<ProductInfo>,
    pub rows: HashMap<String, Vec<serde_json::Value>>,
    pub account: Option<AccountInfo>,
    pub failing_orders: Vec<String>,
    pub fetch_calls: RefCell<Vec<(String, i64, i64)>>,
    pub placed_orders: RefCell<Vec<(String, f64)>>,
}

impl MockExchange {
    pub fn new() -> Self {
        MockExchange {
            products: Vec::new(),
            rows: HashMap::new(),
            account: None,
            failing_orders: Vec::new(),
            fetch_calls: RefCell::new(Vec::new()),
            placed_orders: RefCell::new(Vec::new()),
        }
    }

    pub fn with_product(mut self, info: ProductInfo) -> Self {
        self.products.push(info);
        self
    }

    /// History for `base`, one row per `(day, close, volume)`.
    pub fn with_history(mut self, base: &str, rows: &[(i64, f64, f64)]) -> Self {
        let id = format!("{base}-EUR");
        self.rows.insert(
            id,
            rows.iter()
                .map(|(n, close, volume)| raw_row(*n, *close, *volume))
                .collect(),
        );
        self
    }

    pub fn with_raw_history(mut self, base: &str, rows: Vec<serde_json::Value>) -> Self {
        self.rows.insert(format!("{base}-EUR"), rows);
        self
    }

    pub fn with_account(mut self, currency: &str, balance: f64) -> Self {
        self.account = Some(AccountInfo {
            currency: currency.to_string(),
            balance,
        });
        self
    }

    pub fn with_failing_order(mut self, base: &str) -> Self {
        self.failing_orders.push(format!("{base}-EUR"));
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_calls.borrow().len()
    }
}

impl ExchangePort for MockExchange {
    fn tradable_products(&self, settlement: &str) -> Result<Vec<ProductInfo>, EngineError> {
        Ok(self
            .products
            .iter()
            .filter(|info| info.product.quote() == settlement)
            .cloned()
            .collect())
    }

    fn historical_candles(
        &self,
        product: &Product,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<serde_json::Value>, EngineError> {
        self.fetch_calls.borrow_mut().push((
            product.id().to_string(),
            begin.timestamp(),
            end.timestamp(),
        ));
        let rows = self.rows.get(product.id()).cloned().unwrap_or_default();
        // serve only the requested sub-range, like a real candles endpoint
        Ok(rows
            .into_iter()
            .filter(|row| {
                row[0]
                    .as_i64()
                    .map(|ts| ts >= begin.timestamp() && ts <= end.timestamp())
                    .unwrap_or(true)
            })
            .collect())
    }

    fn account(&self, settlement: &str) -> Result<Option<AccountInfo>, EngineError> {
        Ok(self
            .account
            .as_ref()
            .filter(|account| account.currency == settlement)
            .cloned())
    }

    fn place_market_order(
        &self,
        product: &Product,
        funds: f64,
    ) -> Result<OrderReceipt, EngineError> {
        self.placed_orders
            .borrow_mut()
            .push((product.id().to_string(), funds));
        if self.failing_orders.contains(&product.id().to_string()) {
            return Err(EngineError::Api {
                status: 400,
                reason: "insufficient funds".into(),
            });
        }
        Ok(OrderReceipt {
            id: format!("order-{}", self.placed_orders.borrow().len()),
        })
    }
}

pub struct MockMarketCaps {
    pub entries: Vec<MarketCapEntry>,
    pub fail: bool,
}

impl MockMarketCaps {
    pub fn new(symbols: &[&str]) -> Self {
        MockMarketCaps {
            entries: symbols
                .iter()
                .enumerate()
                .map(|(rank, symbol)| MarketCapEntry {
                    symbol: symbol.to_string(),
                    market_cap: 1_000_000_000.0 / (rank + 1) as f64,
                })
                .collect(),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        MockMarketCaps {
            entries: Vec::new(),
            fail: true,
        }
    }
}

impl MarketCapPort for MockMarketCaps {
    fn ranked_market_caps(&self) -> Result<Vec<MarketCapEntry>, EngineError> {
        if self.fail {
            return Err(EngineError::Http {
                reason: "connection refused".into(),
            });
        }
        Ok(self.entries.clone())
    }
}

#[derive(Default)]
pub struct MemoryTickerStore {
    pub saved: RefCell<TickerCache>,
    pub save_count: Cell<usize>,
}

impl TickerStorePort for MemoryTickerStore {
    fn load(&self) -> Result<TickerCache, EngineError> {
        Ok(self.saved.borrow().clone())
    }

    fn save(&self, cache: &TickerCache) -> Result<(), EngineError> {
        *self.saved.borrow_mut() = cache.clone();
        self.save_count.set(self.save_count.get() + 1);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryRotationState {
    pub cursor: Cell<Option<usize>>,
}

impl RotationStatePort for MemoryRotationState {
    fn load(&self) -> Option<usize> {
        self.cursor.get()
    }

    fn store(&self, ordinal: usize) -> Result<(), EngineError> {
        self.cursor.set(Some(ordinal));
        Ok(())
    }
}

#[derive(Default)]
pub struct CountingPacer {
    pub chunk_pauses: Cell<usize>,
    pub product_pauses: Cell<usize>,
}

impl Pacer for CountingPacer {
    fn chunk_pause(&self) {
        self.chunk_pauses.set(self.chunk_pauses.get() + 1);
    }

    fn product_pause(&self) {
        self.product_pauses.set(self.product_pauses.get() + 1);
    }
}
