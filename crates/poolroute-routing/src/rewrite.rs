//! Request rewriting
//!
//! Retargets an inbound request at one endpoint: the URI authority becomes the
//! endpoint host and the credential header carries the endpoint credential.
//! Everything else (method, version, body, other headers, scheme, path and
//! query) is carried over unchanged.

use bytes::Bytes;
use http::uri::{Authority, Uri};
use http::{HeaderName, HeaderValue, Request};
use poolroute_core::{Endpoint, Error, Result};

/// Reject inbound URIs that cannot be retargeted (no scheme or no host)
pub fn validate_target(uri: &Uri) -> Result<()> {
    if uri.scheme().is_none() {
        return Err(invalid_url(uri, "missing scheme"));
    }
    if uri.authority().is_none() {
        return Err(invalid_url(uri, "missing host"));
    }
    Ok(())
}

/// Produce the outbound request for `endpoint`
///
/// The credential header is overwritten (never appended) and flagged as
/// sensitive. When the endpoint host has no port but the inbound URI does,
/// the inbound port is kept.
pub fn rewrite_request(
    request: &Request<Bytes>,
    endpoint: &Endpoint,
    credential_header: &HeaderName,
) -> Result<Request<Bytes>> {
    let uri = rewrite_uri(request.uri(), endpoint)?;

    let mut credential =
        HeaderValue::from_str(endpoint.credential()).map_err(|_| Error::InvalidEndpoint {
            host: endpoint.host().to_string(),
            reason: "credential is not a valid header value".to_string(),
        })?;
    credential.set_sensitive(true);

    let mut outbound = Request::new(request.body().clone());
    *outbound.method_mut() = request.method().clone();
    *outbound.uri_mut() = uri;
    *outbound.version_mut() = request.version();
    *outbound.headers_mut() = request.headers().clone();
    outbound
        .headers_mut()
        .insert(credential_header.clone(), credential);

    Ok(outbound)
}

fn rewrite_uri(uri: &Uri, endpoint: &Endpoint) -> Result<Uri> {
    validate_target(uri)?;

    let target: Authority = endpoint
        .host()
        .parse()
        .map_err(|e| Error::InvalidEndpoint {
            host: endpoint.host().to_string(),
            reason: format!("host is not a valid authority: {}", e),
        })?;

    let authority = match (target.port_u16(), uri.port_u16()) {
        (None, Some(port)) => format!("{}:{}", target.host(), port)
            .parse::<Authority>()
            .map_err(|e| Error::InvalidEndpoint {
                host: endpoint.host().to_string(),
                reason: format!("cannot combine host with port {}: {}", port, e),
            })?,
        _ => target,
    };

    let mut parts = uri.clone().into_parts();
    parts.authority = Some(authority);
    Uri::from_parts(parts).map_err(|e| invalid_url(uri, &e.to_string()))
}

fn invalid_url(uri: &Uri, reason: &str) -> Error {
    Error::InvalidUrl {
        url: uri.to_string(),
        reason: reason.to_string(),
    }
}
