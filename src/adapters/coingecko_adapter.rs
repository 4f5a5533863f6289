//! CoinGecko market-capitalization adapter.

use log::warn;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::error::EngineError;
use crate::ports::market_cap_port::{MarketCapEntry, MarketCapPort};

pub const DEFAULT_API_URL: &str = "https://api.coingecko.com/api/v3";

pub struct CoinGeckoAdapter {
    client: Client,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct RawMarket {
    symbol: String,
    market_cap: Option<f64>,
}

impl CoinGeckoAdapter {
    pub fn new(api_url: &str) -> Result<Self, EngineError> {
        let client = Client::builder()
            .user_agent(concat!("cryptodca/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| EngineError::Http {
                reason: err.to_string(),
            })?;
        Ok(CoinGeckoAdapter {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

/// Rank order comes from the source; entries without a published cap are
/// dropped.
fn to_entries(raw: Vec<RawMarket>) -> Vec<MarketCapEntry> {
    raw.into_iter()
        .filter_map(|market| match market.market_cap {
            Some(market_cap) => Some(MarketCapEntry {
                symbol: market.symbol,
                market_cap,
            }),
            None => {
                warn!("no market cap published for {}", market.symbol);
                None
            }
        })
        .collect()
}

impl MarketCapPort for CoinGeckoAdapter {
    fn ranked_market_caps(&self) -> Result<Vec<MarketCapEntry>, EngineError> {
        let response = self
            .client
            .get(format!("{}/coins/markets", self.api_url))
            .query(&[
                ("vs_currency", "usd"),
                ("order", "market_cap_desc"),
                ("per_page", "250"),
                ("page", "1"),
            ])
            .send()
            .map_err(|err| EngineError::Http {
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Api {
                status: status.as_u16(),
                reason: response.text().unwrap_or_default(),
            });
        }
        let raw: Vec<RawMarket> = response.json().map_err(|err| EngineError::Http {
            reason: err.to_string(),
        })?;
        Ok(to_entries(raw))
    }
}
