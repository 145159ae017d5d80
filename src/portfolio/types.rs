//! Core portfolio types

use crate::brokers::types::null_as_default;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Message stored on an entry whose initial quote fetch failed
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data";

/// One CSV data row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawRecord {
    /// Column name (trimmed, quote-stripped header) to raw value
    pub fields: BTreeMap<String, String>,
    /// Raw value of the resolved symbol column, if the CSV has one
    pub symbol: Option<String>,
}

impl RawRecord {
    /// Normalized symbol for this row, `None` when blank or absent
    pub fn normalized_symbol(&self) -> Option<Symbol> {
        self.symbol.as_deref().and_then(Symbol::parse)
    }
}

/// Normalized ticker: trimmed, upper-cased, never empty
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            None
        } else {
            Some(Self(normalized))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Quote fields as returned by the quote proxy
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub company_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ltp: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub open: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub high: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub low: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub previous_close: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub change: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub change_percent: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub volume: i64,
}

impl QuoteData {
    /// Zeroed quote used for failed fetches
    pub fn empty(symbol: &Symbol) -> Self {
        Self {
            company_name: symbol.to_string(),
            ..Self::default()
        }
    }
}

/// Outcome of fetching one symbol
#[derive(Debug, Clone, PartialEq)]
pub enum QuoteResult {
    Success {
        symbol: Symbol,
        quote: QuoteData,
        fetched_at: DateTime<Utc>,
    },
    Failure {
        symbol: Symbol,
        reason: String,
    },
}

impl QuoteResult {
    pub fn symbol(&self) -> &Symbol {
        match self {
            QuoteResult::Success { symbol, .. } | QuoteResult::Failure { symbol, .. } => symbol,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, QuoteResult::Success { .. })
    }
}

/// A row of the displayed portfolio
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioEntry {
    /// 1-based position within the upload batch
    pub position: usize,
    pub batch_id: Uuid,
    pub symbol: Symbol,
    pub quote: QuoteData,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Passthrough CSV columns
    pub fields: BTreeMap<String, String>,
    pub error: Option<String>,
}

impl PortfolioEntry {
    /// Numeric CSV column, if present and parseable
    pub fn numeric_field(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(|v| v.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_normalization() {
        assert_eq!(Symbol::parse("  reliance ").unwrap().as_str(), "RELIANCE");
        assert!(Symbol::parse("").is_none());
        assert!(Symbol::parse("   ").is_none());
    }

    #[test]
    fn test_quote_data_defaults_missing_fields() {
        let quote: QuoteData = serde_json::from_str(r#"{"ltp": 101.5}"#).unwrap();
        assert_eq!(quote.ltp, 101.5);
        assert_eq!(quote.volume, 0);
        assert_eq!(quote.previous_close, 0.0);
        assert!(quote.company_name.is_empty());
    }

    #[test]
    fn test_quote_data_null_fields_default() {
        let quote: QuoteData = serde_json::from_str(
            r#"{"companyName": null, "ltp": null, "change": 1.25, "volume": null}"#,
        )
        .unwrap();
        assert_eq!(quote.ltp, 0.0);
        assert_eq!(quote.change, 1.25);
        assert_eq!(quote.volume, 0);
        assert!(quote.company_name.is_empty());
    }

    #[test]
    fn test_quote_data_wire_names() {
        let quote = QuoteData {
            company_name: "TCS".to_string(),
            previous_close: 10.0,
            change_percent: 1.5,
            ..QuoteData::default()
        };
        let value = serde_json::to_value(&quote).unwrap();
        assert_eq!(value["companyName"], "TCS");
        assert_eq!(value["previousClose"], 10.0);
        assert_eq!(value["changePercent"], 1.5);
    }
}
