//! Services Layer
//!
//! Business logic shared by the CLI and the integration tests.
//!
//! # Architecture
//!
//! ```text
//! CLI ──> PortfolioService ──> QuotesService ──> QuoteSource ──> Quote proxy ──> Upstox
//!               │
//!               └──> PortfolioSession
//! ```
//!
//! # Services
//!
//! - `QuotesService` - Concurrent per-symbol quote fetch
//! - `PortfolioService` - Upload, refresh and clear the session portfolio

pub mod portfolio_service;
pub mod quotes_service;

pub use portfolio_service::PortfolioService;
pub use quotes_service::{HttpQuoteSource, QuoteSource, QuotesService};
