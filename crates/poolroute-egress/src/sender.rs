//! reqwest-backed [`HttpSender`]

use crate::client::{HttpClientConfig, create_client};
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use poolroute_core::{HttpSender, Result, TransportError, TransportErrorKind};
use reqwest::Client;
use tracing::{debug, instrument};

/// Sends single attempts over a pooled reqwest client
///
/// Every upstream response is returned as-is, whatever its status; only
/// connection-level problems become [`TransportError`]s.
#[derive(Debug, Clone)]
pub struct ReqwestSender {
    client: Client,
}

impl ReqwestSender {
    pub fn new(config: &HttpClientConfig) -> Result<Self> {
        Ok(Self {
            client: create_client(config)?,
        })
    }

    /// Wrap an already configured client
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpSender for ReqwestSender {
    #[instrument(skip(self, request), fields(host = %host_of(&request)))]
    async fn send(
        &self,
        request: Request<Bytes>,
    ) -> std::result::Result<Response<Bytes>, TransportError> {
        let host = host_of(&request);

        let request = reqwest::Request::try_from(request)
            .map_err(|e| TransportError::new(TransportErrorKind::Other, &host, e.to_string()))?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(|e| classify(&host, &e))?;

        let status = response.status();
        let version = response.version();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(|e| classify(&host, &e))?;

        debug!(
            status = status.as_u16(),
            body_bytes = body.len(),
            "Received response from endpoint"
        );

        let mut out = Response::new(body);
        *out.status_mut() = status;
        *out.version_mut() = version;
        *out.headers_mut() = headers;
        Ok(out)
    }
}

fn host_of(request: &Request<Bytes>) -> String {
    request
        .uri()
        .authority()
        .map(|a| a.to_string())
        .unwrap_or_default()
}

fn classify(host: &str, err: &reqwest::Error) -> TransportError {
    let kind = if err.is_timeout() {
        TransportErrorKind::Timeout
    } else if err.is_connect() {
        TransportErrorKind::Connect
    } else if err.is_body() || err.is_decode() {
        TransportErrorKind::Body
    } else {
        TransportErrorKind::Other
    };

    TransportError::new(kind, host, err.to_string())
}
