//! Joining fetched quotes back onto CSV rows

use crate::portfolio::types::{
    PortfolioEntry, QuoteData, QuoteResult, RawRecord, Symbol, FETCH_FAILED_MESSAGE,
};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Build the portfolio for one upload batch.
///
/// Entry `i` takes the CSV fields of the row that produced `symbols[i]`,
/// overlaid by the first row whose normalized symbol matches, and the
/// quote from `results[i]`. Failed fetches get a zeroed quote and
/// [`FETCH_FAILED_MESSAGE`].
pub fn merge(
    records: &[RawRecord],
    symbols: &[Symbol],
    results: &[QuoteResult],
    batch_id: Uuid,
) -> Vec<PortfolioEntry> {
    let producing: Vec<&RawRecord> = records
        .iter()
        .filter(|r| r.normalized_symbol().is_some())
        .collect();

    symbols
        .iter()
        .enumerate()
        .map(|(i, symbol)| {
            let mut fields = producing
                .get(i)
                .filter(|r| r.normalized_symbol().as_ref() == Some(symbol))
                .map(|r| r.fields.clone())
                .unwrap_or_default();

            if let Some(matched) = first_matching(records, symbol) {
                overlay(&mut fields, &matched.fields);
            }

            let (quote, fetched_at, error) = match results.get(i) {
                Some(QuoteResult::Success {
                    symbol: fetched,
                    quote,
                    fetched_at,
                }) if fetched == symbol => (quote.clone(), Some(*fetched_at), None),
                _ => (
                    QuoteData::empty(symbol),
                    None,
                    Some(FETCH_FAILED_MESSAGE.to_string()),
                ),
            };

            PortfolioEntry {
                position: i + 1,
                batch_id,
                symbol: symbol.clone(),
                quote,
                fetched_at,
                fields,
                error,
            }
        })
        .collect()
}

/// Apply a refresh fetch to existing entries.
///
/// Successful results replace the quote and timestamp and keep
/// everything else, including a previous error. Failed results leave
/// the entry exactly as it was. An entry that failed at load time and
/// then refreshes successfully therefore has both a live quote and an
/// error; see [`table::entry_status`](crate::portfolio::table::entry_status).
pub fn refresh_entries(entries: &[PortfolioEntry], results: &[QuoteResult]) -> Vec<PortfolioEntry> {
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| match results.get(i) {
            Some(QuoteResult::Success {
                symbol,
                quote,
                fetched_at,
            }) if *symbol == entry.symbol => PortfolioEntry {
                quote: QuoteData {
                    company_name: entry.quote.company_name.clone(),
                    ..quote.clone()
                },
                fetched_at: Some(*fetched_at),
                ..entry.clone()
            },
            _ => entry.clone(),
        })
        .collect()
}

fn first_matching<'a>(records: &'a [RawRecord], symbol: &Symbol) -> Option<&'a RawRecord> {
    records
        .iter()
        .find(|r| r.normalized_symbol().as_ref() == Some(symbol))
}

fn overlay(target: &mut BTreeMap<String, String>, source: &BTreeMap<String, String>) {
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}
