//! Portfolio Quotes - CSV portfolio upload with live market quotes
//!
//! A CSV of holdings is parsed, every symbol is quoted concurrently
//! through the quote proxy, and the merged rows form the portfolio
//! table. The proxy itself forwards single-symbol lookups to Upstox.

pub mod brokers;
pub mod config;
pub mod error;
pub mod portfolio;
pub mod proxy;
pub mod services;
pub mod state;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "portfolio_quotes=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
