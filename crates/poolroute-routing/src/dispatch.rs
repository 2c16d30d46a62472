//! Dispatch loop
//!
//! The [`LoadBalancer`] coordinates one logical request across the pool:
//! - Round-robin draw from a cursor shared by all callers
//! - Cooldown skip for endpoints that recently answered 429
//! - Failover to the next endpoint on throttling or transport failure
//! - Pass-through of every other response, error statuses included
//!
//! A logical request consumes at most one slot per endpoint in the pool.
//! Skipping a cooling-down endpoint consumes a slot too, so the loop always
//! terminates, even when every endpoint is unavailable at once.

use crate::{
    cooldown::{CooldownTracker, DEFAULT_COOLDOWN},
    cursor::RoundRobinCursor,
    retry_after::retry_after_from_headers,
    rewrite::{rewrite_request, validate_target},
};
use bytes::Bytes;
use http::{HeaderName, Request, Response, StatusCode};
use poolroute_core::{EndpointRegistry, Error, HttpSender, Result, TransportError};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Header carrying the per-endpoint credential unless configured otherwise
pub const DEFAULT_CREDENTIAL_HEADER: &str = "api-key";

/// Dispatch settings
#[derive(Debug, Clone)]
pub struct DispatchConfig {
    /// Header set to the selected endpoint's credential
    pub credential_header: HeaderName,

    /// Cooldown applied when a 429 carries no usable retry-after hint
    pub default_cooldown: Duration,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            credential_header: HeaderName::from_static(DEFAULT_CREDENTIAL_HEADER),
            default_cooldown: DEFAULT_COOLDOWN,
        }
    }
}

/// Routes requests across an endpoint pool with round-robin and cooldown skip
pub struct LoadBalancer {
    /// Immutable endpoint pool
    registry: EndpointRegistry,

    /// Network I/O for single attempts
    sender: Arc<dyn HttpSender>,

    /// Shared position across all concurrent dispatches
    cursor: RoundRobinCursor,

    /// Per-endpoint throttle expiry
    cooldowns: CooldownTracker,

    credential_header: HeaderName,
}

impl LoadBalancer {
    /// Create a load balancer with default settings
    pub fn new(registry: EndpointRegistry, sender: Arc<dyn HttpSender>) -> Self {
        Self::with_config(registry, sender, DispatchConfig::default())
    }

    pub fn with_config(
        registry: EndpointRegistry,
        sender: Arc<dyn HttpSender>,
        config: DispatchConfig,
    ) -> Self {
        info!(
            endpoints = registry.len(),
            credential_header = %config.credential_header,
            default_cooldown_secs = config.default_cooldown.as_secs(),
            "Load balancer created"
        );

        Self {
            registry,
            sender,
            cursor: RoundRobinCursor::new(),
            cooldowns: CooldownTracker::with_default_cooldown(config.default_cooldown),
            credential_header: config.credential_header,
        }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    pub fn cooldowns(&self) -> &CooldownTracker {
        &self.cooldowns
    }

    /// Endpoints currently cooling down, with time left
    pub fn cooling_down(&self) -> Vec<(String, Duration)> {
        self.cooldowns.snapshot(Instant::now())
    }

    /// Send one logical request through the pool
    ///
    /// Returns the first non-throttled response, whatever its status. Fails
    /// with [`Error::InvalidUrl`] before any attempt if the request URI has no
    /// scheme or host, and with [`Error::EndpointsExhausted`] once every slot
    /// in the pool was throttled, failed, or skipped.
    #[instrument(skip(self, request), fields(method = %request.method(), path = %request.uri().path()))]
    pub async fn dispatch(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        validate_target(request.uri())?;

        let capacity = self.registry.len();
        let mut attempts = 0;
        let mut last_failure: Option<TransportError> = None;

        while attempts < capacity {
            let endpoint = self.registry.get(self.cursor.next_index(capacity));
            attempts += 1;

            if !self.cooldowns.is_eligible(endpoint.host(), Instant::now()) {
                debug!(
                    host = %endpoint.host(),
                    attempt = attempts,
                    "Endpoint cooling down, skipping"
                );
                continue;
            }

            let outbound = rewrite_request(&request, endpoint, &self.credential_header)?;

            debug!(host = %endpoint.host(), attempt = attempts, "Sending request to endpoint");

            match self.sender.send(outbound).await {
                Err(err) => {
                    warn!(
                        host = %endpoint.host(),
                        attempt = attempts,
                        error = %err,
                        "Request to endpoint failed, trying next endpoint"
                    );
                    last_failure = Some(err);
                }
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = retry_after_from_headers(response.headers());
                    let applied =
                        self.cooldowns
                            .mark_throttled(endpoint.host(), retry_after, Instant::now());
                    info!(
                        host = %endpoint.host(),
                        attempt = attempts,
                        retry_after_secs = applied.as_secs(),
                        header_present = retry_after.is_some(),
                        "Endpoint throttled, trying next endpoint"
                    );
                }
                Ok(response) => {
                    if attempts > 1 {
                        info!(
                            host = %endpoint.host(),
                            attempt = attempts,
                            status = response.status().as_u16(),
                            "Request served after failover"
                        );
                    }
                    return Ok(response);
                }
            }
        }

        warn!(attempts, "All endpoints are unavailable or throttling");
        Err(Error::EndpointsExhausted {
            attempts,
            last_failure,
        })
    }
}
