//! Run orchestration: live buy rounds and historical simulation.

use chrono::{Duration, Utc};
use log::{info, warn};

use crate::domain::allocation::allocate;
use crate::domain::cache::TickerCache;
use crate::domain::error::EngineError;
use crate::domain::history::HistoryService;
use crate::domain::ohlcv::day_start;
use crate::domain::order::Order;
use crate::domain::portfolio::Portfolio;
use crate::domain::strategy::{resolve, Strategy};
use crate::domain::trend::TrendAnalyzer;
use crate::ports::exchange_port::ExchangePort;
use crate::ports::market_cap_port::MarketCapPort;
use crate::ports::pacer_port::Pacer;
use crate::ports::store_port::{RotationStatePort, TickerStorePort};

#[derive(Debug, Clone)]
pub struct EngineParams {
    pub settlement_currency: String,
    pub buy_amount: f64,
    /// Venue fee, percent of committed funds, applied to simulated orders.
    pub fee_rate: f64,
    pub strategy: Strategy,
    /// Products kept per period; zero or negative keeps all of them.
    pub limit_products: i64,
}

pub struct TradeEngine<'a> {
    exchange: &'a dyn ExchangePort,
    market_caps: &'a dyn MarketCapPort,
    ticker_store: &'a dyn TickerStorePort,
    rotation_state: &'a dyn RotationStatePort,
    pacer: &'a dyn Pacer,
    params: EngineParams,
    cache: TickerCache,
    portfolio: Portfolio,
}

impl<'a> TradeEngine<'a> {
    pub fn new(
        exchange: &'a dyn ExchangePort,
        market_caps: &'a dyn MarketCapPort,
        ticker_store: &'a dyn TickerStorePort,
        rotation_state: &'a dyn RotationStatePort,
        pacer: &'a dyn Pacer,
        params: EngineParams,
    ) -> Self {
        let portfolio = Portfolio::new(&params.settlement_currency);
        TradeEngine {
            exchange,
            market_caps,
            ticker_store,
            rotation_state,
            pacer,
            params,
            cache: TickerCache::new(),
            portfolio,
        }
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn cache(&self) -> &TickerCache {
        &self.cache
    }

    /// Replay the buy schedule over `periods` consecutive windows of
    /// `interval_days`, oldest first, ending today. Orders are recorded in
    /// the portfolio at each window's end-of-period price. Returns the
    /// portfolio's final gain percentage.
    pub fn simulate(&mut self, interval_days: i64, periods: i64) -> Result<f64, EngineError> {
        let strategy = resolve(self.params.strategy, self.rotation_state)?;
        info!("strategy for this invocation: {strategy}");

        let products = self
            .exchange
            .tradable_products(&self.params.settlement_currency)?;
        info!("found {} tradable products", products.len());

        let today = day_start(Utc::now());
        let begin = today - Duration::days(periods * interval_days);
        HistoryService::new(self.exchange, self.ticker_store, self.pacer).prepare(
            &mut self.cache,
            &products,
            begin,
            today,
        )?;

        let analyzer = TrendAnalyzer::new(&self.cache, self.market_caps);
        for period in (1..=periods).rev() {
            let start = today - Duration::days(period * interval_days);
            let end = start + Duration::days(interval_days);
            info!(
                "computing period {} - {}",
                start.format("%Y-%m-%d"),
                end.format("%Y-%m-%d")
            );

            let scores = analyzer.score(
                &products,
                strategy,
                start,
                end,
                self.params.limit_products,
            )?;
            if scores.is_empty() {
                warn!("no products selected for this period");
                continue;
            }

            let allocations = match allocate(&scores, &products, self.params.buy_amount) {
                Ok(allocations) => allocations,
                Err(EngineError::NoAllocation) => {
                    warn!("total score is zero, skipping period");
                    continue;
                }
                Err(err) => return Err(err),
            };

            for (product, funds) in allocations {
                let Some(candle) = self.cache.candle_at(product.id(), end) else {
                    warn!("missing closing price for {product}, order skipped");
                    continue;
                };
                // candles carry the settlement price of one asset unit
                let unit_price = 1.0 / candle.close;
                self.portfolio
                    .add(Order::buy(product, end, funds, unit_price, self.params.fee_rate));
            }
        }

        Ok(self.portfolio.gain(&self.cache))
    }

    /// Execute one live buy round for the window ending today. Orders go to
    /// the exchange instead of the portfolio; a failed submission does not
    /// stop the remaining orders.
    pub fn run(&mut self, interval_days: i64) -> Result<(), EngineError> {
        let strategy = resolve(self.params.strategy, self.rotation_state)?;
        info!("strategy for this invocation: {strategy}");

        let account = self
            .exchange
            .account(&self.params.settlement_currency)?
            .ok_or_else(|| EngineError::MissingAccount {
                currency: self.params.settlement_currency.clone(),
            })?;
        info!("account balance {} {}", account.balance, account.currency);

        let products = self
            .exchange
            .tradable_products(&self.params.settlement_currency)?;
        info!("found {} tradable products", products.len());

        let end = day_start(Utc::now());
        let begin = end - Duration::days(interval_days);
        HistoryService::new(self.exchange, self.ticker_store, self.pacer).prepare(
            &mut self.cache,
            &products,
            begin,
            end,
        )?;

        let analyzer = TrendAnalyzer::new(&self.cache, self.market_caps);
        let scores = analyzer.score(&products, strategy, begin, end, self.params.limit_products)?;
        if scores.is_empty() {
            warn!("no products selected, nothing to buy");
            return Ok(());
        }

        let allocations = match allocate(&scores, &products, self.params.buy_amount) {
            Ok(allocations) => allocations,
            Err(EngineError::NoAllocation) => {
                warn!("total score is zero, nothing to buy");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        for (product, funds) in allocations {
            info!(
                "executing {product} order for {funds} {}",
                self.params.settlement_currency
            );
            match self.exchange.place_market_order(&product, funds) {
                Ok(receipt) => info!("order {} confirmed", receipt.id),
                Err(err) => warn!("failed to execute order for {product}: {err}"),
            }
        }
        Ok(())
    }
}
