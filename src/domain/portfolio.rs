//! Append-only order ledger and holdings accounting.

use std::collections::HashMap;

use crate::domain::cache::TickerCache;
use crate::domain::order::Order;

/// Accumulates orders for one settlement currency. Holdings always equal
/// the sum of asset amounts over each product's orders.
#[derive(Debug, Clone, Default)]
pub struct Portfolio {
    settlement_currency: String,
    orders: Vec<Order>,
    holdings: HashMap<String, f64>,
}

impl Portfolio {
    pub fn new(settlement_currency: &str) -> Self {
        Portfolio {
            settlement_currency: settlement_currency.to_string(),
            orders: Vec::new(),
            holdings: HashMap::new(),
        }
    }

    pub fn add(&mut self, order: Order) {
        *self
            .holdings
            .entry(order.product().id().to_string())
            .or_insert(0.0) += order.asset_amount();
        self.orders.push(order);
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn holding(&self, product_id: &str) -> f64 {
        self.holdings.get(product_id).copied().unwrap_or(0.0)
    }

    /// Total settlement currency committed across all orders.
    pub fn spent(&self) -> f64 {
        self.orders.iter().map(Order::fund_amount).sum()
    }

    /// Holdings priced at each product's most recent cached close. Products
    /// without any cached close contribute nothing.
    pub fn value(&self, cache: &TickerCache) -> f64 {
        self.holdings
            .iter()
            .filter_map(|(product_id, amount)| {
                cache
                    .latest_close(product_id)
                    .map(|close| amount * close)
            })
            .sum()
    }

    /// Current value as a percentage of total spend. NaN when nothing was
    /// spent, never a division panic.
    pub fn gain(&self, cache: &TickerCache) -> f64 {
        let spent = self.spent();
        if spent == 0.0 {
            return f64::NAN;
        }
        self.value(cache) / spent * 100.0
    }

    pub fn summary(&self, cache: &TickerCache) -> String {
        let mut out = format!("Portfolio contains {} orders\n", self.orders.len());
        for order in &self.orders {
            out.push_str(&order.to_string());
            out.push('\n');
        }
        out.push_str("Total amounts in portfolio:\n");
        let mut holdings: Vec<(&String, &f64)> = self.holdings.iter().collect();
        holdings.sort_by(|a, b| a.0.cmp(b.0));
        for (product_id, amount) in holdings {
            out.push_str(&format!("{amount:.8} {product_id}\n"));
        }
        out.push_str(&format!(
            "Spent {:.4} {currency}, current value {:.4} {currency} ({:.2}%)\n",
            self.spent(),
            self.value(cache),
            self.gain(cache),
            currency = self.settlement_currency,
        ));
        out
    }
}
