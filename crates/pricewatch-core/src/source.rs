//! Remote quote source: trait seam plus the CoinMarketCap implementation.
//!
//! Uses the curl crate (libcurl) for the HTTP call. `quote` blocks; call it
//! from `spawn_blocking` when used from async code.

use std::time::Duration;

use serde_json::Value;

use crate::retry::FetchError;

/// One remote "get a price" operation for a (symbol, currency) pair.
///
/// Implementations must honor their configured timeout and return a
/// classified `FetchError` rather than blocking indefinitely.
pub trait QuoteSource: Send + Sync {
    fn quote(&self, symbol: &str, currency: &str) -> Result<f64, FetchError>;
}

/// CoinMarketCap `quotes/latest` client.
pub struct CmcSource {
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl CmcSource {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            timeout,
        }
    }
}

impl QuoteSource for CmcSource {
    fn quote(&self, symbol: &str, currency: &str) -> Result<f64, FetchError> {
        let symbol = symbol.to_uppercase();
        let currency = currency.to_uppercase();
        let url = format!(
            "{}?symbol={}&convert={}",
            self.api_url, symbol, currency
        );

        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.connect_timeout(self.timeout)?;
        easy.timeout(self.timeout)?;

        let mut list = curl::easy::List::new();
        list.append(&format!("X-CMC_PRO_API_KEY: {}", self.api_key))?;
        list.append("Accept: application/json")?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let code = easy.response_code()?;
        if !(200..300).contains(&code) {
            return Err(FetchError::Status(code));
        }

        extract_price(&body, &symbol, &currency)
    }
}

/// Pull `data.<SYMBOL>.quote.<CURRENCY>.price` out of a quotes/latest payload.
fn extract_price(body: &[u8], symbol: &str, currency: &str) -> Result<f64, FetchError> {
    let payload: Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::Malformed(format!("invalid JSON: {}", e)))?;

    let price = payload
        .get("data")
        .and_then(|v| v.get(symbol))
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.get(currency))
        .and_then(|v| v.get("price"));

    match price {
        None => Err(FetchError::Malformed(format!(
            "price missing for {}/{}",
            symbol, currency
        ))),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| FetchError::Malformed(format!("price is not numeric: {}", v))),
    }
}
