//! Table view helpers: presentation rows, filtering, sorting and the
//! gain/loss summary shown under the portfolio table.

use crate::brokers::types::round2;
use crate::portfolio::types::PortfolioEntry;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::str::FromStr;

/// Sort direction for table columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("Invalid sort direction: {}", other)),
        }
    }
}

/// A single cell value used for ordering
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
}

impl FieldValue {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => {
                a.partial_cmp(b).unwrap_or(Ordering::Equal)
            }
            (FieldValue::Text(a), FieldValue::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
        }
    }
}

/// Flatten an entry into its displayed row.
///
/// Generated fields are written first and CSV columns last, so a CSV
/// column sharing a name with a generated field wins.
pub fn entry_row(entry: &PortfolioEntry) -> Map<String, Value> {
    let quote = &entry.quote;
    let mut row = Map::new();
    row.insert("id".into(), Value::from(entry.position));
    row.insert("symbol".into(), Value::from(entry.symbol.as_str()));
    row.insert("companyName".into(), Value::from(quote.company_name.as_str()));
    row.insert("ltp".into(), Value::from(quote.ltp));
    row.insert("open".into(), Value::from(quote.open));
    row.insert("high".into(), Value::from(quote.high));
    row.insert("low".into(), Value::from(quote.low));
    row.insert("previousClose".into(), Value::from(quote.previous_close));
    row.insert("change".into(), Value::from(quote.change));
    row.insert("changePercent".into(), Value::from(quote.change_percent));
    row.insert("volume".into(), Value::from(quote.volume));
    if let Some(fetched_at) = entry.fetched_at {
        row.insert("lastUpdated".into(), Value::from(fetched_at.to_rfc3339()));
    }
    if let Some(error) = &entry.error {
        row.insert("error".into(), Value::from(error.as_str()));
    }

    for (key, value) in &entry.fields {
        row.insert(key.clone(), Value::from(value.as_str()));
    }

    row
}

/// Value of a displayed column, if the row has it
pub fn field_value(entry: &PortfolioEntry, field: &str) -> Option<FieldValue> {
    match entry_row(entry).remove(field)? {
        Value::Number(n) => n.as_f64().map(FieldValue::Number),
        Value::String(s) => Some(FieldValue::Text(s)),
        _ => None,
    }
}

/// Entries whose symbol or company name contains `query`, ignoring case
pub fn filter_entries<'a>(entries: &'a [PortfolioEntry], query: &str) -> Vec<&'a PortfolioEntry> {
    let needle = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.symbol.as_str().to_lowercase().contains(&needle)
                || entry.quote.company_name.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Stable sort by one column. Rows missing the column go last.
pub fn sort_entries(entries: &mut Vec<&PortfolioEntry>, field: &str, direction: SortDirection) {
    let mut keyed: Vec<(Option<FieldValue>, &PortfolioEntry)> = entries
        .iter()
        .map(|entry| (field_value(entry, field), *entry))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.compare(b),
            SortDirection::Descending => b.compare(a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    *entries = keyed.into_iter().map(|(_, entry)| entry).collect();
}

/// Status column of a row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus<'a> {
    Ok,
    /// Initial fetch failed and no quote has arrived since
    Failed(&'a str),
    /// Initial fetch failed but a later refresh delivered a quote; the
    /// load-time error is still on the entry
    StaleError(&'a str),
}

pub fn entry_status(entry: &PortfolioEntry) -> EntryStatus<'_> {
    match (&entry.error, entry.fetched_at) {
        (None, _) => EntryStatus::Ok,
        (Some(error), None) => EntryStatus::Failed(error),
        (Some(error), Some(_)) => EntryStatus::StaleError(error),
    }
}

/// Gain/loss totals for the portfolio
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub total_entries: usize,
    pub gainers: usize,
    pub losers: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub invested: f64,
    pub current_value: f64,
    pub total_gain_loss: f64,
    pub total_gain_loss_percent: f64,
    pub day_change: f64,
}

/// Rows carrying an error count as failed, including
/// [`EntryStatus::StaleError`] rows.
pub fn summarize(entries: &[PortfolioEntry]) -> PortfolioSummary {
    let mut summary = PortfolioSummary {
        total_entries: entries.len(),
        ..PortfolioSummary::default()
    };

    for entry in entries {
        if entry.error.is_some() {
            summary.failed += 1;
            continue;
        }

        match entry.quote.change.partial_cmp(&0.0) {
            Some(Ordering::Greater) => summary.gainers += 1,
            Some(Ordering::Less) => summary.losers += 1,
            _ => summary.unchanged += 1,
        }

        let quantity = match entry.numeric_field("quantity") {
            Some(q) => q,
            None => continue,
        };
        summary.day_change += quantity * entry.quote.change;

        if let Some(purchase_price) = entry.numeric_field("purchase_price") {
            summary.invested += quantity * purchase_price;
            summary.current_value += quantity * entry.quote.ltp;
        }
    }

    summary.total_gain_loss = round2(summary.current_value - summary.invested);
    summary.total_gain_loss_percent = if summary.invested != 0.0 {
        round2(summary.total_gain_loss / summary.invested * 100.0)
    } else {
        0.0
    };
    summary.invested = round2(summary.invested);
    summary.current_value = round2(summary.current_value);
    summary.day_change = round2(summary.day_change);

    summary
}
