//! Portfolio CSV parsing
//!
//! Lines are split on commas with no support for
//! quoted commas, escaped quotes or multi-line fields. Rows whose field
//! count differs from the header are dropped.

use crate::error::{AppError, Result};
use crate::portfolio::types::RawRecord;
use std::collections::BTreeMap;
use std::path::Path;

/// Sample portfolio offered for download
pub const TEMPLATE_CSV: &str = "symbol,quantity,purchase_price,purchase_date
RELIANCE,10,2450.50,2024-01-15
TCS,5,3500.00,2024-02-10
INFY,15,1450.75,2024-03-05
HDFCBANK,8,1600.25,2024-01-20
ICICIBANK,12,950.00,2024-02-28
";

/// Header names recognised as the symbol column, in priority order
const SYMBOL_HEADERS: [&str; 3] = ["symbol", "Symbol", "SYMBOL"];

/// Parse CSV text into one record per accepted data row
pub fn parse(text: &str) -> Result<Vec<RawRecord>> {
    let lines: Vec<&str> = text.trim().lines().collect();
    if lines.len() < 2 {
        return Err(AppError::MalformedInput(
            "CSV must contain a header and at least one data row".to_string(),
        ));
    }

    let headers = split_line(lines[0]);
    let symbol_column = resolve_symbol_column(&headers);

    let records = lines[1..]
        .iter()
        .map(|line| split_line(line))
        .filter(|values| values.len() == headers.len())
        .map(|values| {
            let symbol = symbol_column.map(|idx| values[idx].clone());
            let fields: BTreeMap<String, String> =
                headers.iter().cloned().zip(values).collect();
            RawRecord { fields, symbol }
        })
        .collect();

    Ok(records)
}

/// Read and parse a CSV file
pub fn load_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
    let text = std::fs::read_to_string(path)?;
    parse(&text)
}

fn split_line(line: &str) -> Vec<String> {
    line.split(',')
        .map(|field| field.trim().replace('"', ""))
        .collect()
}

/// Index of the symbol column: exact casings first, then any
/// case-insensitive match in header order.
fn resolve_symbol_column(headers: &[String]) -> Option<usize> {
    SYMBOL_HEADERS
        .iter()
        .find_map(|name| headers.iter().position(|h| h == name))
        .or_else(|| headers.iter().position(|h| h.eq_ignore_ascii_case("symbol")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let records = parse("symbol,quantity\nRELIANCE,100\nTCS,50").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].fields["symbol"], "RELIANCE");
        assert_eq!(records[0].fields["quantity"], "100");
        assert_eq!(records[1].symbol.as_deref(), Some("TCS"));
    }

    #[test]
    fn test_parse_requires_header_and_data() {
        assert!(matches!(parse(""), Err(AppError::MalformedInput(_))));
        assert!(matches!(parse("onlyheader"), Err(AppError::MalformedInput(_))));
        assert!(matches!(parse("\n\n  symbol,qty  \n\n"), Err(AppError::MalformedInput(_))));
    }

    #[test]
    fn test_parse_drops_rows_with_wrong_field_count() {
        let text = "symbol,quantity\nRELIANCE,100\nTCS\nINFY,10,extra\nHDFCBANK,5";
        let records = parse(text).unwrap();
        let symbols: Vec<_> = records.iter().map(|r| r.fields["symbol"].as_str()).collect();
        assert_eq!(symbols, vec!["RELIANCE", "HDFCBANK"]);
    }

    #[test]
    fn test_parse_strips_quotes_and_whitespace() {
        let records = parse("\"Symbol\" , \"Qty\"\r\n \"tcs\" , \"5\" \r\n").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields["Qty"], "5");
        assert_eq!(records[0].symbol.as_deref(), Some("tcs"));
    }

    #[test]
    fn test_quoted_commas_are_not_supported() {
        // The quoted comma splits the field, so the row is dropped
        let records = parse("symbol,name\nTCS,\"Tata, Consultancy\"\nINFY,Infosys").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].fields["symbol"], "INFY");
    }

    #[test]
    fn test_symbol_column_priority() {
        let records = parse("SYMBOL,Symbol\nupper,title").unwrap();
        assert_eq!(records[0].symbol.as_deref(), Some("title"));

        let records = parse("Ticker,sYmBoL\nx,mixed").unwrap();
        assert_eq!(records[0].symbol.as_deref(), Some("mixed"));

        let records = parse("ticker,qty\nTCS,1").unwrap();
        assert!(records[0].symbol.is_none());
    }

    #[test]
    fn test_template_parses() {
        let records = parse(TEMPLATE_CSV).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(TEMPLATE_CSV.trim().lines().count(), 6);
        assert_eq!(records[4].fields["symbol"], "ICICIBANK");
        assert!(records.iter().all(|r| r.fields.contains_key("purchase_date")));
    }

    #[test]
    fn test_load_csv_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("portfolio.csv");
        std::fs::write(&path, "symbol,quantity\nINFY,3\n").unwrap();

        let records = load_csv_file(&path).unwrap();
        assert_eq!(records.len(), 1);

        let missing = load_csv_file(dir.path().join("missing.csv"));
        assert!(matches!(missing, Err(AppError::Io(_))));
    }
}
