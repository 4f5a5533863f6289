//! Market-capitalization ranking port.

use crate::domain::error::EngineError;

/// One entry of the external ranking, in source order (largest cap first).
#[derive(Debug, Clone, PartialEq)]
pub struct MarketCapEntry {
    pub symbol: String,
    pub market_cap: f64,
}

pub trait MarketCapPort {
    fn ranked_market_caps(&self) -> Result<Vec<MarketCapEntry>, EngineError>;
}
