//! Common test utilities for integration tests

use bytes::Bytes;
use http::Request;
use poolroute_core::{Endpoint, EndpointRegistry};
use poolroute_egress::{HttpClientConfig, ReqwestSender};
use poolroute_routing::LoadBalancer;
use std::sync::Arc;
use wiremock::MockServer;

pub const CHAT_PATH: &str = "/openai/deployments/gpt-4/chat/completions";

/// Endpoint pointing at a mock server, keyed `key-<index>`
#[allow(dead_code)]
pub fn endpoint_for(server: &MockServer, index: usize) -> Endpoint {
    Endpoint::new(server.address().to_string(), format!("key-{}", index))
}

/// A host:port with nothing listening on it
#[allow(dead_code)]
pub fn dead_host() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr.to_string()
}

/// Load balancer over `endpoints` using the real reqwest sender
#[allow(dead_code)]
pub fn create_balancer(endpoints: Vec<Endpoint>) -> LoadBalancer {
    let registry = EndpointRegistry::new(endpoints).unwrap();
    let config = HttpClientConfig {
        timeout_secs: 5,
        connect_timeout_secs: 2,
        ..Default::default()
    };
    let sender = ReqwestSender::new(&config).unwrap();
    LoadBalancer::new(registry, Arc::new(sender))
}

/// Chat completion request against a placeholder host
#[allow(dead_code)]
pub fn create_chat_request() -> Request<Bytes> {
    Request::builder()
        .method("POST")
        .uri(format!(
            "http://seed.invalid{}?api-version=2023-12-01-preview",
            CHAT_PATH
        ))
        .header("content-type", "application/json")
        .body(Bytes::from_static(
            br#"{"messages":[{"role":"user","content":"test message"}]}"#,
        ))
        .unwrap()
}
