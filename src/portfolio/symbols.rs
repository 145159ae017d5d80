//! Symbol extraction from parsed CSV records

use crate::error::{AppError, Result};
use crate::portfolio::types::{RawRecord, Symbol};

/// Normalized symbols in row order. Duplicates are kept.
pub fn extract_symbols(records: &[RawRecord]) -> Result<Vec<Symbol>> {
    let symbols: Vec<Symbol> = records
        .iter()
        .filter_map(RawRecord::normalized_symbol)
        .collect();

    if symbols.is_empty() {
        return Err(AppError::NoSymbolColumn);
    }

    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::csv::parse;

    fn as_strings(symbols: &[Symbol]) -> Vec<&str> {
        symbols.iter().map(Symbol::as_str).collect()
    }

    #[test]
    fn test_extract_in_row_order() {
        let records = parse("symbol,quantity\nRELIANCE,100\nTCS,50").unwrap();
        let symbols = extract_symbols(&records).unwrap();
        assert_eq!(as_strings(&symbols), vec!["RELIANCE", "TCS"]);
    }

    #[test]
    fn test_extract_normalizes_and_skips_blanks() {
        let records = parse("Symbol,qty\n infy ,1\n,2\n   ,3\ntcs,4").unwrap();
        let symbols = extract_symbols(&records).unwrap();
        assert_eq!(as_strings(&symbols), vec!["INFY", "TCS"]);
    }

    #[test]
    fn test_extract_keeps_duplicates() {
        let records = parse("symbol,qty\nINFY,1\ninfy,2").unwrap();
        let symbols = extract_symbols(&records).unwrap();
        assert_eq!(as_strings(&symbols), vec!["INFY", "INFY"]);
    }

    #[test]
    fn test_extract_without_symbol_column() {
        let records = parse("ticker,qty\nTCS,1").unwrap();
        assert!(matches!(extract_symbols(&records), Err(AppError::NoSymbolColumn)));
    }

    #[test]
    fn test_extract_all_blank() {
        let records = parse("symbol,qty\n,1\n ,2").unwrap();
        assert!(matches!(extract_symbols(&records), Err(AppError::NoSymbolColumn)));
    }

    #[test]
    fn test_extract_empty_records() {
        assert!(matches!(extract_symbols(&[]), Err(AppError::NoSymbolColumn)));
    }
}
