//! Quotes Service
//!
//! Fetches one quote per symbol from the quote proxy. All requests for a
//! batch are in flight at once and the batch completes when every one
//! has settled. Individual failures are returned as data.

use crate::error::{AppError, Result};
use crate::portfolio::types::{QuoteData, QuoteResult, Symbol, FETCH_FAILED_MESSAGE};
use crate::proxy::QuoteRequest;
use async_trait::async_trait;
use chrono::Utc;
use futures_util::future::join_all;
use reqwest::Client;
use tracing::{debug, info, warn};

/// Something that can produce a quote for a symbol
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<QuoteData>;
}

/// Quote source backed by the HTTP quote proxy
pub struct HttpQuoteSource {
    client: Client,
    proxy_url: String,
}

impl HttpQuoteSource {
    pub fn new(proxy_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            proxy_url: proxy_url.into(),
        }
    }

    pub fn proxy_url(&self) -> &str {
        &self.proxy_url
    }
}

#[async_trait]
impl QuoteSource for HttpQuoteSource {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<QuoteData> {
        let response = self
            .client
            .post(&self.proxy_url)
            .json(&QuoteRequest {
                symbol: Some(symbol.to_string()),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.bytes().await?;
        let mut quote: QuoteData = serde_json::from_slice(&body)?;
        if quote.company_name.is_empty() {
            quote.company_name = symbol.to_string();
        }

        Ok(quote)
    }
}

/// Quotes service for business logic
pub struct QuotesService;

impl QuotesService {
    /// Fetch quotes for every symbol concurrently.
    ///
    /// Always returns exactly one result per input symbol, in input order.
    pub async fn fetch_quotes(source: &dyn QuoteSource, symbols: &[Symbol]) -> Vec<QuoteResult> {
        info!("QuotesService::fetch_quotes - {} symbols", symbols.len());

        let tasks = symbols.iter().map(|symbol| async move {
            match source.fetch_quote(symbol).await {
                Ok(quote) => {
                    debug!("Fetched quote for {}: ltp={}", symbol, quote.ltp);
                    QuoteResult::Success {
                        symbol: symbol.clone(),
                        quote,
                        fetched_at: Utc::now(),
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch quote for {}: {}", symbol, e);
                    QuoteResult::Failure {
                        symbol: symbol.clone(),
                        reason: FETCH_FAILED_MESSAGE.to_string(),
                    }
                }
            }
        });

        join_all(tasks).await
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Scripted quote source for tests
    #[derive(Default)]
    pub struct MockQuoteSource {
        pub quotes: HashMap<String, QuoteData>,
        pub delays_ms: HashMap<String, u64>,
        pub calls: Mutex<Vec<String>>,
    }

    impl MockQuoteSource {
        pub fn with_quote(mut self, symbol: &str, ltp: f64, previous_close: f64) -> Self {
            let change = crate::brokers::types::round2(ltp - previous_close);
            let change_percent = if previous_close != 0.0 {
                crate::brokers::types::round2(change / previous_close * 100.0)
            } else {
                0.0
            };
            self.quotes.insert(
                symbol.to_string(),
                QuoteData {
                    company_name: format!("{} Ltd", symbol),
                    ltp,
                    open: previous_close,
                    high: ltp.max(previous_close),
                    low: ltp.min(previous_close),
                    previous_close,
                    change,
                    change_percent,
                    volume: 12345,
                },
            );
            self
        }

        pub fn with_delay(mut self, symbol: &str, ms: u64) -> Self {
            self.delays_ms.insert(symbol.to_string(), ms);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl QuoteSource for MockQuoteSource {
        async fn fetch_quote(&self, symbol: &Symbol) -> Result<QuoteData> {
            self.calls.lock().push(symbol.to_string());
            if let Some(ms) = self.delays_ms.get(symbol.as_str()) {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
            }
            self.quotes
                .get(symbol.as_str())
                .cloned()
                .ok_or_else(|| AppError::Internal(format!("network error for {}", symbol)))
        }
    }
}
