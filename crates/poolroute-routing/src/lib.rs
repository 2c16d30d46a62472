//! PoolRoute Routing Engine
//!
//! This crate provides the endpoint selection and failover logic for PoolRoute:
//! - Round-robin cursor shared across concurrent requests
//! - Cooldown tracking for throttled endpoints
//! - Request rewriting (host substitution and credential injection)
//! - The dispatch loop and its `tower::Service` adapter

pub mod cooldown;
pub mod cursor;
pub mod dispatch;
pub mod retry_after;
pub mod rewrite;
pub mod service;

// Re-export commonly used types
pub use cooldown::{CooldownTracker, DEFAULT_COOLDOWN};
pub use cursor::RoundRobinCursor;
pub use dispatch::{DEFAULT_CREDENTIAL_HEADER, DispatchConfig, LoadBalancer};
pub use retry_after::{parse_retry_after, retry_after_from_headers};
pub use rewrite::{rewrite_request, validate_target};
pub use service::LoadBalancerService;
