//! Portfolio pipeline
//!
//! ```text
//! CSV text ─> csv::parse ─> symbols::extract_symbols ─> (fetch) ─> merge::merge
//!                                                                     │
//!                                      table (filter / sort / summary) <┘
//! ```

pub mod csv;
pub mod merge;
pub mod symbols;
pub mod table;
pub mod types;

pub use types::{PortfolioEntry, QuoteData, QuoteResult, RawRecord, Symbol, FETCH_FAILED_MESSAGE};
