//! Upstream market-data provider adapters

pub mod types;
pub mod upstox;

use crate::portfolio::types::QuoteData;
use async_trait::async_trait;
use types::ProviderError;

/// Trait implemented by every upstream quote provider
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Provider ID (e.g., "upstox")
    fn id(&self) -> &'static str;

    /// Provider display name
    fn name(&self) -> &'static str;

    /// Fetch a normalized quote for one symbol
    async fn get_quote(
        &self,
        access_token: &str,
        symbol: &str,
    ) -> std::result::Result<QuoteData, ProviderError>;
}
