//! Coinbase-Exchange REST adapter.
//!
//! Public endpoints serve products and candles; accounts and orders need
//! HMAC-signed requests. Without credentials the public surface still works,
//! account and order calls fail with a configuration error.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use log::warn;
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use sha2::Sha256;

use crate::domain::error::EngineError;
use crate::domain::product::{Product, ProductInfo};
use crate::ports::exchange_port::{AccountInfo, ExchangePort, OrderReceipt};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_API_URL: &str = "https://api.exchange.coinbase.com";

#[derive(Debug, Clone)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
    pub passphrase: String,
}

pub struct CoinbaseAdapter {
    client: Client,
    api_url: String,
    credentials: Option<Credentials>,
}

#[derive(Debug, Deserialize)]
struct RawProduct {
    id: String,
    quote_currency: String,
    status: String,
    trading_disabled: bool,
    min_market_funds: String,
    quote_increment: String,
}

#[derive(Debug, Deserialize)]
struct RawAccount {
    currency: String,
    balance: String,
}

#[derive(Debug, Deserialize)]
struct RawOrder {
    id: String,
}

impl CoinbaseAdapter {
    pub fn new(api_url: &str, credentials: Option<Credentials>) -> Result<Self, EngineError> {
        let client = Client::builder()
            .user_agent(concat!("cryptodca/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(http_err)?;
        Ok(CoinbaseAdapter {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn signed_headers(
        &self,
        method: &str,
        path: &str,
        body: &str,
    ) -> Result<HeaderMap, EngineError> {
        let creds = self
            .credentials
            .as_ref()
            .ok_or_else(|| EngineError::ConfigMissing {
                section: "exchange".into(),
                key: "key".into(),
            })?;

        let timestamp = Utc::now().timestamp().to_string();
        let prehash = format!("{timestamp}{method}{path}{body}");
        let mut mac = HmacSha256::new_from_slice(creds.secret.as_bytes()).map_err(|_| {
            EngineError::ConfigInvalid {
                name: "secret".into(),
                reason: "unusable signing key".into(),
            }
        })?;
        mac.update(prehash.as_bytes());
        let signature = hex::encode(mac.finalize().into_bytes());

        let mut headers = HeaderMap::new();
        headers.insert("CB-ACCESS-KEY", header_value(&creds.key)?);
        headers.insert("CB-ACCESS-SIGN", header_value(&signature)?);
        headers.insert("CB-ACCESS-TIMESTAMP", header_value(&timestamp)?);
        headers.insert("CB-ACCESS-PASSPHRASE", header_value(&creds.passphrase)?);
        Ok(headers)
    }
}

fn http_err(err: reqwest::Error) -> EngineError {
    EngineError::Http {
        reason: err.to_string(),
    }
}

fn header_value(value: &str) -> Result<HeaderValue, EngineError> {
    HeaderValue::from_str(value).map_err(|_| EngineError::ConfigInvalid {
        name: "exchange credentials".into(),
        reason: "value not usable as an http header".into(),
    })
}

fn check(response: Response) -> Result<Response, EngineError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(EngineError::Api {
            status: status.as_u16(),
            reason: response.text().unwrap_or_default(),
        })
    }
}

/// Keep only online, enabled pairs settling in `settlement`; rows with
/// unparsable constraints are dropped.
fn to_product_info(raw: RawProduct, settlement: &str) -> Option<ProductInfo> {
    if raw.trading_disabled || raw.status != "online" || raw.quote_currency != settlement {
        return None;
    }
    let product = match Product::from_id(&raw.id) {
        Ok(product) => product,
        Err(err) => {
            warn!("skipping product: {err}");
            return None;
        }
    };
    let (Ok(min_market_funds), Ok(quote_increment)) =
        (raw.min_market_funds.parse::<f64>(), raw.quote_increment.parse::<f64>())
    else {
        warn!("skipping {} with unparsable constraints", raw.id);
        return None;
    };
    Some(ProductInfo::new(product, min_market_funds, quote_increment))
}

impl ExchangePort for CoinbaseAdapter {
    fn tradable_products(&self, settlement: &str) -> Result<Vec<ProductInfo>, EngineError> {
        let response = self
            .client
            .get(format!("{}/products", self.api_url))
            .send()
            .map_err(http_err)?;
        let raw: Vec<RawProduct> = check(response)?.json().map_err(http_err)?;
        Ok(raw
            .into_iter()
            .filter_map(|raw| to_product_info(raw, settlement))
            .collect())
    }

    fn historical_candles(
        &self,
        product: &Product,
        begin: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<serde_json::Value>, EngineError> {
        let response = self
            .client
            .get(format!("{}/products/{}/candles", self.api_url, product.id()))
            .query(&[
                ("start", begin.to_rfc3339()),
                ("end", end.to_rfc3339()),
                ("granularity", "86400".to_string()),
            ])
            .send()
            .map_err(http_err)?;
        check(response)?.json().map_err(http_err)
    }

    fn account(&self, settlement: &str) -> Result<Option<AccountInfo>, EngineError> {
        let path = "/coinbase-accounts";
        let headers = self.signed_headers("GET", path, "")?;
        let response = self
            .client
            .get(format!("{}{}", self.api_url, path))
            .headers(headers)
            .send()
            .map_err(http_err)?;
        let accounts: Vec<RawAccount> = check(response)?.json().map_err(http_err)?;

        Ok(accounts
            .into_iter()
            .find(|account| account.currency == settlement)
            .map(|account| AccountInfo {
                balance: account.balance.parse().unwrap_or_else(|_| {
                    warn!("unparsable balance for {}", account.currency);
                    0.0
                }),
                currency: account.currency,
            }))
    }

    fn place_market_order(
        &self,
        product: &Product,
        funds: f64,
    ) -> Result<OrderReceipt, EngineError> {
        let path = "/orders";
        let body = serde_json::json!({
            "product_id": product.id(),
            "side": "buy",
            "type": "market",
            "funds": funds.to_string(),
        })
        .to_string();
        let headers = self.signed_headers("POST", path, &body)?;
        let response = self
            .client
            .post(format!("{}{}", self.api_url, path))
            .headers(headers)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .map_err(http_err)?;
        let order: RawOrder = check(response)?.json().map_err(http_err)?;
        Ok(OrderReceipt { id: order.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, quote: &str, status: &str, disabled: bool) -> RawProduct {
        RawProduct {
            id: id.to_string(),
            quote_currency: quote.to_string(),
            status: status.to_string(),
            trading_disabled: disabled,
            min_market_funds: "1.0".to_string(),
            quote_increment: "0.01".to_string(),
        }
    }

    #[test]
    fn keeps_online_pairs_for_settlement() {
        let info = to_product_info(raw("BTC-EUR", "EUR", "online", false), "EUR").unwrap();
        assert_eq!(info.product.id(), "BTC-EUR");
        assert_eq!(info.min_market_funds, 1.0);
        assert_eq!(info.quote_increment, 0.01);
    }

    #[test]
    fn filters_disabled_offline_and_foreign_quotes() {
        assert!(to_product_info(raw("BTC-EUR", "EUR", "online", true), "EUR").is_none());
        assert!(to_product_info(raw("BTC-EUR", "EUR", "delisted", false), "EUR").is_none());
        assert!(to_product_info(raw("BTC-USD", "USD", "online", false), "EUR").is_none());
    }

    #[test]
    fn drops_unparsable_constraints() {
        let mut bad = raw("BTC-EUR", "EUR", "online", false);
        bad.min_market_funds = "lots".to_string();
        assert!(to_product_info(bad, "EUR").is_none());
    }

    #[test]
    fn product_payload_deserializes() {
        let text = r#"{
            "id": "BTC-EUR",
            "quote_currency": "EUR",
            "status": "online",
            "trading_disabled": false,
            "min_market_funds": "10",
            "quote_increment": "0.01",
            "base_currency": "BTC"
        }"#;
        let raw: RawProduct = serde_json::from_str(text).unwrap();
        assert_eq!(raw.id, "BTC-EUR");
        assert!(to_product_info(raw, "EUR").is_some());
    }
}
