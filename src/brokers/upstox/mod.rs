//! Upstox market-quote adapter

use crate::brokers::types::{null_as_default, round2, ProviderError};
use crate::brokers::QuoteProvider;
use crate::error::Result;
use crate::portfolio::types::QuoteData;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

pub const BASE_URL: &str = "https://api.upstox.com";

/// Equity segment prefix used in instrument keys
const SEGMENT: &str = "NSE_EQ";

/// Upstox quote client
pub struct UpstoxBroker {
    client: Client,
    base_url: String,
}

impl UpstoxBroker {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn get_headers(&self, access_token: &str) -> reqwest::header::HeaderMap {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );
        if let Ok(value) = format!("Bearer {}", access_token).parse() {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }
        headers
    }

    /// Instrument key sent in the request, e.g. `NSE_EQ|RELIANCE`
    pub fn instrument_key(symbol: &str) -> String {
        format!("{}|{}", SEGMENT, symbol)
    }

    /// Key Upstox uses in the response payload, e.g. `NSE_EQ:RELIANCE`
    pub fn response_key(symbol: &str) -> String {
        format!("{}:{}", SEGMENT, symbol)
    }
}

#[derive(Debug, Deserialize)]
struct QuotesResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    data: HashMap<String, QuoteItem>,
}

#[derive(Debug, Deserialize)]
struct QuoteItem {
    #[serde(default, deserialize_with = "null_as_default")]
    symbol: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    last_price: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    volume: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    ohlc: Ohlc,
}

#[derive(Debug, Default, Deserialize)]
struct Ohlc {
    #[serde(default, deserialize_with = "null_as_default")]
    open: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    high: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    low: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    close: f64,
}

/// Build the normalized quote. `change` is rounded first and the
/// percentage derived from it, so the two always agree to 0.01.
fn build_quote(symbol: &str, item: &QuoteItem) -> QuoteData {
    let ltp = item.last_price;
    let previous_close = item.ohlc.close;
    let change = round2(ltp - previous_close);
    let change_percent = if previous_close != 0.0 {
        round2(change / previous_close * 100.0)
    } else {
        0.0
    };

    QuoteData {
        company_name: item
            .symbol
            .clone()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| symbol.to_string()),
        ltp,
        open: item.ohlc.open,
        high: item.ohlc.high,
        low: item.ohlc.low,
        previous_close,
        change,
        change_percent,
        volume: item.volume,
    }
}

#[async_trait]
impl QuoteProvider for UpstoxBroker {
    fn id(&self) -> &'static str {
        "upstox"
    }

    fn name(&self) -> &'static str {
        "Upstox"
    }

    async fn get_quote(
        &self,
        access_token: &str,
        symbol: &str,
    ) -> std::result::Result<QuoteData, ProviderError> {
        let instrument_key = Self::instrument_key(symbol);
        let url = format!(
            "{}/v2/market-quote/quotes?instrument_key={}",
            self.base_url,
            urlencoding::encode(&instrument_key)
        );
        debug!("Upstox quote request: {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.get_headers(access_token))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let details = serde_json::from_str::<Value>(&text).unwrap_or_else(|_| Value::String(text));
            warn!("Upstox returned {} for {}", status, symbol);
            return Err(ProviderError::Status {
                status: status.as_u16(),
                details,
            });
        }

        let result: QuotesResponse = response.json().await?;

        let key = Self::response_key(symbol);
        match result.data.get(&key) {
            Some(item) => Ok(build_quote(symbol, item)),
            None => {
                let mut available: Vec<String> = result.data.keys().cloned().collect();
                available.sort();
                Err(ProviderError::NotFound {
                    symbol: symbol.to_string(),
                    available,
                })
            }
        }
    }
}
