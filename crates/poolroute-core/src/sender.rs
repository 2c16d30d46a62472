//! HTTP sender trait definition

use crate::TransportError;
use bytes::Bytes;
use http::{Request, Response};

/// Performs the network I/O for a single attempt
///
/// Implementations send exactly one request and report either the response
/// (whatever its status) or a connection-level failure. Retries, pooling and
/// TLS are the implementation's concern; timeouts surface as
/// [`TransportError`] of kind `Timeout`.
#[async_trait::async_trait]
pub trait HttpSender: Send + Sync {
    async fn send(
        &self,
        request: Request<Bytes>,
    ) -> std::result::Result<Response<Bytes>, TransportError>;
}
