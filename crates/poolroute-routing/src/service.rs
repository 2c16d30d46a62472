//! `tower::Service` adapter
//!
//! Lets the pool sit underneath any tower-based HTTP client stack as its
//! transport: each `call` is one logical request through [`LoadBalancer::dispatch`].

use crate::dispatch::LoadBalancer;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::{Request, Response};
use poolroute_core::Error;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

/// Cloneable service handle sharing one [`LoadBalancer`]
#[derive(Clone)]
pub struct LoadBalancerService {
    balancer: Arc<LoadBalancer>,
}

impl LoadBalancerService {
    pub fn new(balancer: Arc<LoadBalancer>) -> Self {
        Self { balancer }
    }

    pub fn balancer(&self) -> &Arc<LoadBalancer> {
        &self.balancer
    }
}

impl From<LoadBalancer> for LoadBalancerService {
    fn from(balancer: LoadBalancer) -> Self {
        Self::new(Arc::new(balancer))
    }
}

impl Service<Request<Bytes>> for LoadBalancerService {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // Capacity is decided per request inside the dispatch loop
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let balancer = self.balancer.clone();
        Box::pin(async move { balancer.dispatch(request).await })
    }
}
