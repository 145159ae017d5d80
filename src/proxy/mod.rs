//! Quote proxy service
//!
//! Receives `{ "symbol": ... }`, asks the upstream provider for a quote
//! and returns a normalized payload or a fixed-shape error.
//!
//! Endpoints:
//! - `POST /api/quote` (alias `/api/stock-quote`)
//! - `GET /health`

mod cors;
pub mod handlers;
mod server;
mod types;

pub use cors::{ALLOW_HEADERS, ALLOW_METHODS, ALLOW_ORIGIN};
pub use handlers::ProxyState;
pub use server::{build_router, ProxyServer};
pub use types::{ProxyError, QuoteRequest};
