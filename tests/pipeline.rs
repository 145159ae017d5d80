//! Full pipeline: CSV upload -> HttpQuoteSource -> quote proxy -> mock Upstox

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use portfolio_quotes::config::ProxyConfig;
use portfolio_quotes::portfolio::table;
use portfolio_quotes::portfolio::FETCH_FAILED_MESSAGE;
use portfolio_quotes::proxy::ProxyServer;
use portfolio_quotes::services::{HttpQuoteSource, PortfolioService};
use portfolio_quotes::state::{PortfolioSession, SessionStatus};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const TOKEN: &str = "integration-token";

async fn upstox_quotes(
    axum::extract::State(ticks): axum::extract::State<Arc<AtomicU64>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let expected = format!("Bearer {}", TOKEN);
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(expected.as_str()) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "status": "error" }))).into_response();
    }

    match params.get("instrument_key").map(String::as_str) {
        Some("NSE_EQ|RELIANCE") => {
            // Each call moves the price up by one rupee
            let tick = ticks.fetch_add(1, Ordering::SeqCst) as f64;
            Json(json!({
                "status": "success",
                "data": {
                    "NSE_EQ:RELIANCE": {
                        "symbol": "RELIANCE",
                        "last_price": 2500.0 + tick,
                        "volume": 5000,
                        "ohlc": { "open": 2460.0, "high": 2510.0, "low": 2440.0, "close": 2450.0 }
                    }
                }
            }))
            .into_response()
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({ "status": "error", "errors": [{ "message": "Invalid instrument key" }] })),
        )
            .into_response(),
    }
}

async fn spawn_upstox() -> String {
    let app = Router::new()
        .route("/v2/market-quote/quotes", get(upstox_quotes))
        .with_state(Arc::new(AtomicU64::new(0)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_proxy(upstox_url: String, token: Option<&str>) -> ProxyServer {
    let config = ProxyConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        upstox_base_url: upstox_url,
        access_token: token.map(str::to_string),
    };
    let mut server = ProxyServer::new(config);
    server.start().await.unwrap();
    server
}

#[tokio::test]
async fn test_upload_and_refresh_through_proxy() {
    let proxy = spawn_proxy(spawn_upstox().await, Some(TOKEN)).await;
    let url = format!("http://{}/api/quote", proxy.local_addr().unwrap());
    let source = HttpQuoteSource::new(url);
    let session = PortfolioSession::new();

    let loaded = PortfolioService::upload(&session, &source, "symbol,quantity\nRELIANCE,100\nTCS,50")
        .await
        .unwrap();

    assert_eq!(loaded.status, SessionStatus::Loaded);
    assert_eq!(loaded.entries.len(), 2);

    let reliance = &loaded.entries[0];
    assert_eq!(reliance.symbol.as_str(), "RELIANCE");
    assert_eq!(reliance.quote.company_name, "RELIANCE");
    assert_eq!(reliance.quote.ltp, 2500.0);
    assert_eq!(reliance.quote.previous_close, 2450.0);
    assert_eq!(reliance.quote.change, 50.0);
    assert_eq!(reliance.quote.change_percent, 2.04);
    assert_eq!(reliance.fields["quantity"], "100");
    assert!(reliance.fetched_at.is_some());

    let tcs = &loaded.entries[1];
    assert_eq!(tcs.symbol.as_str(), "TCS");
    assert_eq!(tcs.quote.company_name, "TCS");
    assert_eq!(tcs.quote.ltp, 0.0);
    assert_eq!(tcs.error.as_deref(), Some(FETCH_FAILED_MESSAGE));
    assert_eq!(tcs.fields["quantity"], "50");

    let summary = table::summarize(&loaded.entries);
    assert_eq!(summary.gainers, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.day_change, 5000.0);

    let refreshed = PortfolioService::refresh(&session, &source).await.unwrap();
    assert_eq!(refreshed.batch_id, loaded.batch_id);
    assert_eq!(refreshed.entries[0].quote.ltp, 2501.0);
    assert_eq!(refreshed.entries[0].quote.change, 51.0);
    assert!(refreshed.entries[0].fetched_at >= reliance.fetched_at);
    assert_eq!(refreshed.entries[1], *tcs);
}

#[tokio::test]
async fn test_missing_token_marks_every_row_failed() {
    let proxy = spawn_proxy(spawn_upstox().await, None).await;
    let url = format!("http://{}/api/quote", proxy.local_addr().unwrap());
    let source = HttpQuoteSource::new(url);
    let session = PortfolioSession::new();

    let snapshot = PortfolioService::upload(&session, &source, "Symbol,qty\nreliance,1\n infy ,2")
        .await
        .unwrap();

    assert_eq!(snapshot.entries.len(), 2);
    assert_eq!(snapshot.entries[0].symbol.as_str(), "RELIANCE");
    assert_eq!(snapshot.entries[1].symbol.as_str(), "INFY");
    assert!(snapshot
        .entries
        .iter()
        .all(|e| e.error.as_deref() == Some(FETCH_FAILED_MESSAGE)));
}

#[tokio::test]
async fn test_proxy_reports_upstream_errors_to_direct_callers() {
    let proxy = spawn_proxy(spawn_upstox().await, Some(TOKEN)).await;
    let client = reqwest::Client::new();
    let base = format!("http://{}", proxy.local_addr().unwrap());

    let response = client
        .post(format!("{}/api/stock-quote", base))
        .json(&json!({ "symbol": "tcs" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Failed to fetch data from Upstox");
    assert_eq!(body["details"]["status"], "error");

    let response = client
        .post(format!("{}/api/quote", base))
        .json(&json!({ "symbol": " reliance " }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["companyName"], "RELIANCE");
    assert_eq!(body["previousClose"], 2450.0);
}
