//! Endpoint descriptors and the immutable endpoint registry

use crate::{Error, Result};
use http::HeaderValue;
use http::uri::Authority;
use std::collections::HashSet;
use std::fmt;

/// One backend host plus the credential used to access it
///
/// `host` is an HTTP authority: a host name or address, optionally with a port
/// (`aoai-eastus.openai.azure.com`, `127.0.0.1:8080`).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    host: String,
    credential: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, credential: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            credential: credential.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn credential(&self) -> &str {
        &self.credential
    }

    /// Identity key within a registry (hosts compare case-insensitively)
    pub fn key(&self) -> String {
        self.host.to_ascii_lowercase()
    }

    fn validate(&self) -> Result<()> {
        self.host
            .parse::<Authority>()
            .map_err(|e| Error::InvalidEndpoint {
                host: self.host.clone(),
                reason: format!("host is not a valid authority: {}", e),
            })?;

        HeaderValue::from_str(&self.credential).map_err(|_| Error::InvalidEndpoint {
            host: self.host.clone(),
            reason: "credential is not a valid header value".to_string(),
        })?;

        Ok(())
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("credential", &"<redacted>")
            .finish()
    }
}

/// Ordered, non-empty, immutable list of endpoints
#[derive(Debug, Clone)]
pub struct EndpointRegistry {
    endpoints: Vec<Endpoint>,
}

impl EndpointRegistry {
    /// Build a registry, rejecting empty pools, duplicate hosts and malformed entries
    pub fn new(endpoints: Vec<Endpoint>) -> Result<Self> {
        if endpoints.is_empty() {
            return Err(Error::EmptyRegistry);
        }

        let mut seen = HashSet::with_capacity(endpoints.len());
        for endpoint in &endpoints {
            endpoint.validate()?;
            if !seen.insert(endpoint.key()) {
                return Err(Error::DuplicateHost(endpoint.host.clone()));
            }
        }

        tracing::debug!(endpoints = endpoints.len(), "Endpoint registry created");

        Ok(Self { endpoints })
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// Whether the pool has no endpoints
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Endpoint at `index` modulo the pool size
    pub fn get(&self, index: usize) -> &Endpoint {
        &self.endpoints[index % self.endpoints.len()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Endpoint> {
        self.endpoints.iter()
    }

    pub fn hosts(&self) -> Vec<&str> {
        self.endpoints.iter().map(|e| e.host()).collect()
    }
}
