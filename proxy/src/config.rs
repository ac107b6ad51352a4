//! Proxy configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! - `EXTERNAL_API_URL` - Base URL of the external product service
//!   (default: `http://localhost:8001`)
//! - `PROXY_HOST` - Bind address (default: 127.0.0.1)
//! - `PROXY_PORT` - Listen port (default: 3000)
//! - `UPSTREAM_TIMEOUT_SECS` - Hard timeout for outbound calls (default: none)

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_EXTERNAL_API_URL: &str = "http://localhost:8001";
const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Base for every outbound call
    pub external_api_url: String,
    pub host: IpAddr,
    pub port: u16,
    /// Applied to each upstream request when set
    pub upstream_timeout: Option<Duration>,
}

impl ProxyConfig {
    /// Load configuration from the process environment, reading `.env`
    /// first if one is present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let external_api_url = lookup("EXTERNAL_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_EXTERNAL_API_URL.to_string());
        url::Url::parse(&external_api_url)
            .map_err(|e| invalid("EXTERNAL_API_URL", e.to_string()))?;

        let host = match lookup("PROXY_HOST") {
            Some(raw) => raw
                .parse()
                .map_err(|_| invalid("PROXY_HOST", format!("not an IP address: {raw}")))?,
            None => IpAddr::V4(Ipv4Addr::LOCALHOST),
        };

        let port = match lookup("PROXY_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| invalid("PROXY_PORT", format!("not a port: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let upstream_timeout = match lookup("UPSTREAM_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw
                    .parse()
                    .map_err(|_| invalid("UPSTREAM_TIMEOUT_SECS", format!("not a number: {raw}")))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            external_api_url,
            host,
            port,
            upstream_timeout,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn invalid(key: &str, reason: String) -> ConfigError {
    ConfigError::InvalidEnvVar(key.to_string(), reason)
}
