//! Trading pair identity and venue constraints.

use crate::domain::error::EngineError;

/// An ordered (base asset, settlement asset) pair. Identity and equality are
/// defined solely by the canonical `"BASE-QUOTE"` id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Product {
    id: String,
    base: String,
    quote: String,
}

impl Product {
    pub fn new(base: &str, quote: &str) -> Self {
        Product {
            id: format!("{base}-{quote}"),
            base: base.to_string(),
            quote: quote.to_string(),
        }
    }

    /// Parse a canonical `"BASE-QUOTE"` id.
    pub fn from_id(id: &str) -> Result<Self, EngineError> {
        match id.split_once('-') {
            Some((base, quote)) if !base.is_empty() && !quote.is_empty() => {
                Ok(Product::new(base, quote))
            }
            _ => Err(EngineError::BadProductId { id: id.to_string() }),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }
}

impl std::fmt::Display for Product {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// A tradable product together with the venue's order constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductInfo {
    pub product: Product,
    /// Smallest amount of settlement currency the venue accepts per order.
    pub min_market_funds: f64,
    /// Smallest price unit the venue quotes the pair in.
    pub quote_increment: f64,
}

impl ProductInfo {
    pub fn new(product: Product, min_market_funds: f64, quote_increment: f64) -> Self {
        ProductInfo {
            product,
            min_market_funds,
            quote_increment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_id_splits_base_and_quote() {
        let p = Product::from_id("BTC-EUR").unwrap();
        assert_eq!(p.base(), "BTC");
        assert_eq!(p.quote(), "EUR");
        assert_eq!(p.id(), "BTC-EUR");
    }

    #[test]
    fn new_builds_canonical_id() {
        let p = Product::new("ETH", "USD");
        assert_eq!(p.id(), "ETH-USD");
        assert_eq!(p.to_string(), "ETH-USD");
    }

    #[test]
    fn from_id_rejects_malformed() {
        assert!(Product::from_id("BTCEUR").is_err());
        assert!(Product::from_id("-EUR").is_err());
        assert!(Product::from_id("BTC-").is_err());
        assert!(Product::from_id("").is_err());
    }

    #[test]
    fn equality_is_by_id() {
        assert_eq!(Product::new("BTC", "EUR"), Product::from_id("BTC-EUR").unwrap());
        assert_ne!(Product::new("BTC", "EUR"), Product::new("BTC", "USD"));
    }
}
