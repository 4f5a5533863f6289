//! A single funding decision.

use chrono::{DateTime, Utc};

use crate::domain::product::Product;

/// Default venue fee, percent of committed funds.
pub const DEFAULT_FEE_RATE: f64 = 0.5;

/// One executed or simulated buy. Immutable once created via [`Order::buy`].
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    product: Product,
    fund_amount: f64,
    fee: f64,
    unit_price: f64,
    asset_amount: f64,
    executed_at: DateTime<Utc>,
}

impl Order {
    /// `unit_price` is the amount of base asset acquired per unit of
    /// settlement currency.
    pub fn buy(
        product: Product,
        executed_at: DateTime<Utc>,
        fund_amount: f64,
        unit_price: f64,
        fee_rate: f64,
    ) -> Self {
        Order {
            product,
            fund_amount,
            fee: fund_amount * fee_rate / 100.0,
            unit_price,
            asset_amount: fund_amount * unit_price,
            executed_at,
        }
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn fund_amount(&self) -> f64 {
        self.fund_amount
    }

    pub fn fee(&self) -> f64 {
        self.fee
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    pub fn asset_amount(&self) -> f64 {
        self.asset_amount
    }

    pub fn executed_at(&self) -> DateTime<Utc> {
        self.executed_at
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] Order {:.4} {} for {:.4} (fee {:.4}) | unit price {}",
            self.executed_at.format("%d.%m.%Y %H:%M:%S"),
            self.asset_amount,
            self.product.base(),
            self.fund_amount,
            self.fee,
            self.unit_price
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_650_067_200, 0).unwrap()
    }

    #[test]
    fn buy_derives_fee_and_asset_amount() {
        let order = Order::buy(Product::new("BTC", "EUR"), at(), 50.0, 0.000_025, 0.5);

        assert_eq!(order.fund_amount(), 50.0);
        assert_eq!(order.fee(), 50.0 * 0.5 / 100.0);
        assert_eq!(order.asset_amount(), 50.0 * 0.000_025);
        assert_eq!(order.unit_price(), 0.000_025);
        assert_eq!(order.executed_at(), at());
    }

    #[test]
    fn zero_fee_rate() {
        let order = Order::buy(Product::new("ETH", "EUR"), at(), 100.0, 0.01, 0.0);
        assert_eq!(order.fee(), 0.0);
    }

    #[test]
    fn display_mentions_base_and_amounts() {
        let order = Order::buy(Product::new("BTC", "EUR"), at(), 50.0, 0.5, 0.5);
        let text = order.to_string();
        assert!(text.contains("BTC"));
        assert!(text.contains("25.0000"));
        assert!(text.contains("50.0000"));
    }
}
