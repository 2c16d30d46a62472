//! End-to-end integration tests for PoolRoute
//!
//! These tests wire the tower adapter, the dispatch loop and the reqwest
//! sender together against mocked endpoints.

#[cfg(test)]
mod e2e_tests {
    use bytes::Bytes;
    use http::{Request, StatusCode};
    use poolroute_core::{Endpoint, EndpointRegistry};
    use poolroute_egress::{HttpClientConfig, ReqwestSender};
    use poolroute_routing::{LoadBalancer, LoadBalancerService};
    use serde_json::json;
    use std::sync::Arc;
    use tower::ServiceExt;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    #[tokio::test]
    async fn test_e2e_chat_completion_through_service() {
        // Start mock endpoint
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/openai/deployments/gpt-4/chat/completions"))
            .and(query_param("api-version", "2023-12-01-preview"))
            .and(header("api-key", "key1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-e2e-test",
                "object": "chat.completion",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hello from the pool!"},
                    "finish_reason": "stop"
                }]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let registry = EndpointRegistry::new(vec![Endpoint::new(
            mock_server.address().to_string(),
            "key1",
        )])
        .unwrap();
        let sender = ReqwestSender::new(&HttpClientConfig::default()).unwrap();
        let service: LoadBalancerService = LoadBalancer::new(registry, Arc::new(sender)).into();

        // The seed host is a placeholder; the pool retargets it
        let request = Request::builder()
            .method("POST")
            .uri("http://seed.invalid/openai/deployments/gpt-4/chat/completions?api-version=2023-12-01-preview")
            .header("content-type", "application/json")
            .header("api-key", "does-not-matter")
            .body(Bytes::from(
                json!({
                    "messages": [{"role": "system", "content": "You are a helpful assistant."}]
                })
                .to_string(),
            ))
            .unwrap();

        let response = service.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(json["id"], "chatcmpl-e2e-test");
        assert_eq!(
            json["choices"][0]["message"]["content"],
            "Hello from the pool!"
        );
    }
}
