//! Exchange collaborator port.

use chrono::{DateTime, Utc};

use crate::domain::error::EngineError;
use crate::domain::product::{Product, ProductInfo};

#[derive(Debug, Clone, PartialEq)]
pub struct AccountInfo {
    pub currency: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub id: String,
}

pub trait ExchangePort {
    /// Every online, tradable pair settling in `settlement`, with its venue
    /// constraints.
    fn tradable_products(&self, settlement: &str) -> Result<Vec<ProductInfo>, EngineError>;

    /// Raw daily history rows `[time, low, high, open, close, volume]` for
    /// `[begin, end]`. Rows are returned untyped; the caller drops anything
    /// that fails to parse.
    fn historical_candles(
        &self,
        product: &Product,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<serde_json::Value>, EngineError>;

    /// Account holding `settlement`, if the venue has one.
    fn account(&self, settlement: &str) -> Result<Option<AccountInfo>, EngineError>;

    /// Market buy of `funds` settlement currency worth of `product`.
    fn place_market_order(
        &self,
        product: &Product,
        funds: f64,
    ) -> Result<OrderReceipt, EngineError>;
}
