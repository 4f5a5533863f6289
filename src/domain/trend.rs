//! Per-period trend scoring and ranking.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use log::warn;

use crate::domain::cache::TickerCache;
use crate::domain::error::EngineError;
use crate::domain::ohlcv::day_key;
use crate::domain::product::{Product, ProductInfo};
use crate::domain::strategy::Strategy;
use crate::ports::market_cap_port::MarketCapPort;

/// Largest product limit accepted by the market-cap strategy; anything
/// bigger is refused rather than hammering the external source.
pub const MARKET_CAP_LIMIT_CEILING: i64 = 30;

/// Every market-cap match scores the same so allocation treats them equally.
const MARKET_CAP_UNIFORM_SCORE: f64 = 1.0;

pub struct TrendAnalyzer<'a> {
    cache: &'a TickerCache,
    market_caps: &'a dyn MarketCapPort,
}

impl<'a> TrendAnalyzer<'a> {
    pub fn new(cache: &'a TickerCache, market_caps: &'a dyn MarketCapPort) -> Self {
        TrendAnalyzer { cache, market_caps }
    }

    /// Rank `products` for the period `[start, end]` under a concrete
    /// strategy. The result is truncated to `limit` entries only when the
    /// unranked set already holds at least that many; `limit <= 0` keeps
    /// everything.
    pub fn score(
        &self,
        products: &[ProductInfo],
        strategy: Strategy,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<(Product, f64)>, EngineError> {
        match strategy {
            Strategy::TopMarketCap => self.score_by_market_cap(products, limit),
            Strategy::Mixed => Err(EngineError::ConfigInvalid {
                name: "strategy".into(),
                reason: "mixed must be resolved before scoring".into(),
            }),
            _ => Ok(self.score_by_history(products, strategy, start, end, limit)),
        }
    }

    fn score_by_history(
        &self,
        products: &[ProductInfo],
        strategy: Strategy,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: i64,
    ) -> Vec<(Product, f64)> {
        let mut trend: Vec<(Product, f64)> = Vec::new();
        for info in products {
            let pid = info.product.id();
            let (Some(old), Some(now)) = (
                self.cache.candle_at(pid, start),
                self.cache.candle_at(pid, end),
            ) else {
                warn!(
                    "unable to compute trend for {pid}, missing ticker information {}-{}",
                    day_key(start),
                    day_key(end)
                );
                continue;
            };

            let score = match strategy {
                Strategy::TopGainers | Strategy::TopLosers => {
                    (now.close - old.close) / now.close * 100.0
                }
                _ => (now.volume - old.volume) / now.volume * 100.0,
            };
            trend.push((info.product.clone(), score));
        }

        let descending = matches!(strategy, Strategy::TopGainers | Strategy::TopVolume);
        trend.sort_by(|a, b| {
            let ord = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
            if descending { ord.reverse() } else { ord }
        });

        if limit > 0 && trend.len() as i64 >= limit {
            trend.truncate(limit as usize);
        }
        trend
    }

    /// Rank by the external market-cap source instead of local history.
    /// Matches accumulate in source rank order; a source failure yields an
    /// empty ranking.
    fn score_by_market_cap(
        &self,
        products: &[ProductInfo],
        limit: i64,
    ) -> Result<Vec<(Product, f64)>, EngineError> {
        if limit > MARKET_CAP_LIMIT_CEILING {
            return Err(EngineError::ConfigInvalid {
                name: "limit".into(),
                reason: format!("{limit} exceeds the market-cap strategy ceiling of {MARKET_CAP_LIMIT_CEILING}"),
            });
        }

        let entries = match self.market_caps.ranked_market_caps() {
            Ok(entries) => entries,
            Err(err) => {
                warn!("market-cap lookup failed, no products selected: {err}");
                return Ok(Vec::new());
            }
        };

        let mut ranked: Vec<(Product, f64)> = Vec::new();
        for entry in entries {
            if limit > 0 && ranked.len() as i64 >= limit {
                break;
            }
            let matched = products.iter().find(|info| {
                info.product.base().eq_ignore_ascii_case(&entry.symbol)
                    && !ranked.iter().any(|(p, _)| p == &info.product)
            });
            if let Some(info) = matched {
                ranked.push((info.product.clone(), MARKET_CAP_UNIFORM_SCORE));
            }
        }
        Ok(ranked)
    }
}
