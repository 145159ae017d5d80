//! HTTP server for the quote proxy

use crate::brokers::upstox::UpstoxBroker;
use crate::brokers::QuoteProvider;
use crate::config::ProxyConfig;
use crate::error::{AppError, Result};
use crate::proxy::cors::cors_middleware;
use crate::proxy::handlers::{self, ProxyState};
use axum::{
    middleware,
    routing::{get, post, MethodRouter},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

fn quote_route() -> MethodRouter<Arc<ProxyState>> {
    // OPTIONS never reaches routing; cors_middleware answers it
    post(handlers::get_quote).fallback(handlers::method_not_allowed)
}

/// Build the proxy router around a provider
pub fn build_router(state: Arc<ProxyState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/quote", quote_route())
        .route("/api/stock-quote", quote_route())
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(middleware::from_fn(cors_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Quote proxy server manager
pub struct ProxyServer {
    config: ProxyConfig,
    provider: Option<Arc<dyn QuoteProvider>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    local_addr: Option<SocketAddr>,
}

impl ProxyServer {
    /// Create a server backed by Upstox
    pub fn new(config: ProxyConfig) -> Self {
        Self {
            config,
            provider: None,
            shutdown_tx: None,
            local_addr: None,
        }
    }

    /// Create a server backed by a custom provider
    pub fn with_provider(config: ProxyConfig, provider: Arc<dyn QuoteProvider>) -> Self {
        Self {
            config,
            provider: Some(provider),
            shutdown_tx: None,
            local_addr: None,
        }
    }

    /// Bind and start serving in the background. Returns the bound address.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid address: {}", e)))?;

        let provider = match &self.provider {
            Some(provider) => provider.clone(),
            None => Arc::new(UpstoxBroker::new(self.config.upstox_base_url.clone())?),
        };

        if self.config.access_token.is_none() {
            error!("UPSTOX_ACCESS_TOKEN is not set; quote requests will fail with 500");
        }

        info!("Quote provider: {} ({})", provider.name(), provider.id());
        let state = Arc::new(ProxyState::new(provider, self.config.access_token.clone()));
        let app = build_router(state);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| AppError::Config(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);
        self.local_addr = Some(local_addr);

        tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                info!("Quote proxy shutting down");
            });

            if let Err(e) = server.await {
                error!("Quote proxy error: {}", e);
            }
        });

        info!("Quote proxy listening on {}", local_addr);
        info!("  GET  http://{}/health", local_addr);
        info!("  POST http://{}/api/quote", local_addr);

        Ok(local_addr)
    }

    /// Stop the server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            info!("Quote proxy stop signal sent");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl Drop for ProxyServer {
    fn drop(&mut self) {
        self.stop();
    }
}
