//! Error types for PoolRoute Core

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Configuration errors
    #[error("Endpoint registry cannot be empty")]
    EmptyRegistry,

    #[error("Duplicate endpoint host: {0}")]
    DuplicateHost(String),

    #[error("Invalid endpoint '{host}': {reason}")]
    InvalidEndpoint { host: String, reason: String },

    #[error("Invalid request URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration not found")]
    ConfigNotFound,

    // Dispatch errors
    #[error(
        "All endpoints are unavailable or throttling (attempts: {attempts}){}",
        last_failure.as_ref().map(|e| format!(", last failure: {}", e)).unwrap_or_default()
    )]
    EndpointsExhausted {
        attempts: usize,
        last_failure: Option<TransportError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for the terminal "no endpoint could serve this request" failure
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::EndpointsExhausted { .. })
    }

    /// True for errors raised independently of any network attempt
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::EmptyRegistry
                | Error::DuplicateHost(_)
                | Error::InvalidEndpoint { .. }
                | Error::InvalidUrl { .. }
                | Error::Config(_)
                | Error::ConfigNotFound
                | Error::Io(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Category of a connection-level failure reported by an [`crate::HttpSender`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Could not establish a connection (refused, DNS, TLS handshake)
    Connect,
    /// The attempt did not complete in time
    Timeout,
    /// The response body could not be read
    Body,
    /// Anything else the sender could not classify
    Other,
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Body => "body",
            TransportErrorKind::Other => "other",
        };
        f.write_str(label)
    }
}

/// A single failed network attempt against one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error talking to {host}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub host: String,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, host: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            host: host.into(),
            message: message.into(),
        }
    }

    pub fn connect(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Connect, host, message)
    }

    pub fn timeout(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(TransportErrorKind::Timeout, host, message)
    }
}
