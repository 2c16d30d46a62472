//! Shared HTTP client utilities

use poolroute_core::{Error, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Per-attempt request timeout in seconds
    /// Note: This applies to the entire attempt including reading the body.
    /// A timed out attempt is reported as a transport failure and the pool
    /// moves on to the next endpoint.
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Seconds an idle pooled connection is kept before it is dropped
    pub pool_idle_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 600,
            connect_timeout_secs: 10,
            pool_max_idle_per_host: 32,
            // Expire idle connections before upstream servers close them
            pool_idle_timeout_secs: 90,
            user_agent: format!("poolroute/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Create a configured HTTP client with connection pooling
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(config.pool_idle_timeout_secs))
        .user_agent(&config.user_agent)
        // TCP keep-alive prevents firewall/load balancer timeouts during long requests
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))
}
