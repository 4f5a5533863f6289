//! Historical-data preparation: fill the ticker cache for a date range.

use chrono::{DateTime, Duration, Utc};
use log::{info, warn};

use crate::domain::cache::TickerCache;
use crate::domain::error::EngineError;
use crate::domain::ohlcv::{day_start, parse_row};
use crate::domain::product::ProductInfo;
use crate::ports::exchange_port::ExchangePort;
use crate::ports::pacer_port::Pacer;
use crate::ports::store_port::TickerStorePort;

/// Remote daily-candle endpoints cap the rows per request, so longer spans
/// are fetched in sub-ranges of this many days.
pub const CHUNK_DAYS: i64 = 280;

/// Products fetched between pauses within one chunk.
pub const PRODUCTS_PER_PAUSE: usize = 10;

pub struct HistoryService<'a> {
    exchange: &'a dyn ExchangePort,
    store: &'a dyn TickerStorePort,
    pacer: &'a dyn Pacer,
}

impl<'a> HistoryService<'a> {
    pub fn new(
        exchange: &'a dyn ExchangePort,
        store: &'a dyn TickerStorePort,
        pacer: &'a dyn Pacer,
    ) -> Self {
        HistoryService {
            exchange,
            store,
            pacer,
        }
    }

    /// Ensure `cache` holds daily candles for every product across
    /// `[begin, end]` (best effort) and persist the result.
    ///
    /// Products whose boundary days are already cached are not re-fetched;
    /// the check is shallow and does not verify intermediate days. Rows that
    /// fail to parse are dropped. Fetch errors propagate.
    pub fn prepare(
        &self,
        cache: &mut TickerCache,
        products: &[ProductInfo],
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let loaded = self.store.load()?;
        if !loaded.is_empty() {
            info!("reading ticker cache from store");
            *cache = loaded;
        }

        let begin = day_start(begin);
        let end = day_start(end);
        let cap = end.min(day_start(Utc::now()));

        let pending: Vec<&ProductInfo> = products
            .iter()
            .filter(|info| {
                let pid = info.product.id();
                if cache.covers(pid, begin, end) {
                    info!("product {pid} already in cache");
                    false
                } else {
                    true
                }
            })
            .collect();

        for (chunk_index, (chunk_begin, chunk_end)) in
            chunk_ranges(begin, cap).into_iter().enumerate()
        {
            if chunk_index > 0 {
                self.pacer.chunk_pause();
            }
            for (product_index, info) in pending.iter().enumerate() {
                let pid = info.product.id();
                info!(
                    "lookup {pid} historical data {}-{}",
                    chunk_begin.format("%Y-%m-%d"),
                    chunk_end.format("%Y-%m-%d")
                );
                let rows = self
                    .exchange
                    .historical_candles(&info.product, chunk_begin, chunk_end)?;
                for row in &rows {
                    match parse_row(row) {
                        Some((day, candle)) => cache.insert(pid, day, candle),
                        None => warn!("dropping malformed ticker row for {pid}: {row}"),
                    }
                }
                if (product_index + 1) % PRODUCTS_PER_PAUSE == 0 {
                    self.pacer.product_pause();
                }
            }
        }

        for info in &pending {
            let pid = info.product.id();
            if !cache.covers(pid, begin, end) {
                warn!("incomplete historical data for {pid}");
            }
        }

        self.store.save(cache)
    }
}

/// Split `[begin, cap]` into sequential sub-ranges of at most
/// [`CHUNK_DAYS`]; each sub-range's end is the next one's start.
fn chunk_ranges(begin: DateTime<Utc>, cap: DateTime<Utc>) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut chunks = Vec::new();
    let mut start = begin;
    loop {
        let end = (start + Duration::days(CHUNK_DAYS)).min(cap);
        chunks.push((start, end));
        if end >= cap {
            break;
        }
        start = end;
    }
    chunks
}
