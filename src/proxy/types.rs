//! Quote proxy wire types

use crate::brokers::types::ProviderError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Quote request - POST /api/quote
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Errors returned by the quote endpoint, each with a fixed JSON body
#[derive(Debug, Clone, PartialEq)]
pub enum ProxyError {
    MethodNotAllowed,
    MissingSymbol,
    TokenNotConfigured,
    Upstream { status: u16, details: Value },
    SymbolNotFound { symbol: String, available: Vec<String> },
    Internal(String),
}

impl From<ProviderError> for ProxyError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Status { status, details } => ProxyError::Upstream { status, details },
            ProviderError::NotFound { symbol, available } => {
                ProxyError::SymbolNotFound { symbol, available }
            }
            ProviderError::Transport(message) => ProxyError::Internal(message),
        }
    }
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::MissingSymbol => StatusCode::BAD_REQUEST,
            ProxyError::TokenNotConfigured | ProxyError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ProxyError::Upstream { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            ProxyError::SymbolNotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn body(&self) -> Value {
        match self {
            ProxyError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            ProxyError::MissingSymbol => json!({ "error": "Symbol is required" }),
            ProxyError::TokenNotConfigured => {
                json!({ "error": "Upstox access token not configured" })
            }
            ProxyError::Upstream { details, .. } => json!({
                "error": "Failed to fetch data from Upstox",
                "details": details,
            }),
            ProxyError::SymbolNotFound { symbol, available } => json!({
                "error": format!("Stock data not found for symbol {}", symbol),
                "availableSymbols": available,
            }),
            ProxyError::Internal(message) => json!({
                "error": "Failed to fetch stock data",
                "message": message,
            }),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
