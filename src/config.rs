//! Environment-driven configuration
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file. CLI flags override them in `main`.

use crate::brokers::upstox;
use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PROXY_URL: &str = "http://127.0.0.1:3000/api/quote";

/// Load `.env` into the process environment if one exists
pub fn load_dotenv() {
    if let Ok(path) = dotenv::dotenv() {
        tracing::debug!("Loaded environment from {:?}", path);
    }
}

/// Quote proxy server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub upstox_base_url: String,
    /// Absent token is reported per request, not at startup
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            upstox_base_url: upstox::BASE_URL.to_string(),
            access_token: None,
        }
    }
}

impl ProxyConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup("PROXY_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("Invalid PROXY_PORT '{}': {}", raw, e)))?,
            None => defaults.port,
        };

        let upstox_base_url = lookup("UPSTOX_BASE_URL").unwrap_or(defaults.upstox_base_url);
        validate_url("UPSTOX_BASE_URL", &upstox_base_url)?;

        Ok(Self {
            host: lookup("PROXY_HOST").unwrap_or(defaults.host),
            port,
            upstox_base_url,
            access_token: lookup("UPSTOX_ACCESS_TOKEN").filter(|t| !t.trim().is_empty()),
        })
    }
}

/// Client-side configuration for the upload pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub proxy_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            proxy_url: DEFAULT_PROXY_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let proxy_url = lookup("QUOTE_PROXY_URL").unwrap_or_else(|| DEFAULT_PROXY_URL.to_string());
        Self::with_proxy_url(proxy_url)
    }

    pub fn with_proxy_url(proxy_url: impl Into<String>) -> Result<Self> {
        let proxy_url = proxy_url.into();
        validate_url("QUOTE_PROXY_URL", &proxy_url)?;
        Ok(Self { proxy_url })
    }
}

fn validate_url(name: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| AppError::Config(format!("Invalid {} '{}': {}", name, value, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(AppError::Config(format!(
            "Invalid {} '{}': unsupported scheme {}",
            name, value, other
        ))),
    }
}
