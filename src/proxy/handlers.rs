//! Quote proxy endpoint handlers

use crate::brokers::QuoteProvider;
use crate::portfolio::types::QuoteData;
use crate::proxy::types::{ProxyError, QuoteRequest};
use axum::{
    body::Bytes,
    extract::{Json, State as AxumState},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared state for proxy handlers
pub struct ProxyState {
    pub provider: Arc<dyn QuoteProvider>,
    pub access_token: Option<String>,
}

impl ProxyState {
    pub fn new(provider: Arc<dyn QuoteProvider>, access_token: Option<String>) -> Self {
        Self {
            provider,
            access_token: access_token.filter(|t| !t.trim().is_empty()),
        }
    }
}

/// Health check endpoint - GET /health
pub async fn health_check() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn method_not_allowed() -> ProxyError {
    ProxyError::MethodNotAllowed
}

pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

/// Quote endpoint - POST /api/quote
///
/// Body: `{ "symbol": "RELIANCE" }`. The body is decoded by hand so a
/// missing or malformed body maps to the same 400 as a missing symbol.
pub async fn get_quote(
    AxumState(state): AxumState<Arc<ProxyState>>,
    body: Bytes,
) -> Result<Json<QuoteData>, ProxyError> {
    let request: QuoteRequest = serde_json::from_slice(&body).unwrap_or_default();

    let symbol = request
        .symbol
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .ok_or(ProxyError::MissingSymbol)?;

    let access_token = state.access_token.as_deref().ok_or_else(|| {
        error!("Upstox access token not configured");
        ProxyError::TokenNotConfigured
    })?;

    info!("Fetching {} quote for {}", state.provider.name(), symbol);

    match state.provider.get_quote(access_token, &symbol).await {
        Ok(quote) => Ok(Json(quote)),
        Err(e) => {
            warn!("Quote request for {} failed: {}", symbol, e);
            Err(ProxyError::from(e))
        }
    }
}
