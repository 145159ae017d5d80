//! Common upstream provider types

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// Failure reported by an upstream market-data provider
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Provider answered with a non-success HTTP status
    #[error("Provider returned status {status}")]
    Status { status: u16, details: Value },

    /// Provider answered but the requested instrument was not in the payload
    #[error("Symbol {symbol} not present in provider response")]
    NotFound {
        symbol: String,
        available: Vec<String>,
    },

    /// Transport failure or undecodable payload
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Transport(err.to_string())
    }
}

/// Decode a JSON `null` the same way as an absent field.
/// Pair with `#[serde(default)]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
