//! PoolRoute Egress
//!
//! This crate provides the network side of PoolRoute:
//! - Shared reqwest client construction
//! - `ReqwestSender`, the production `HttpSender`

pub mod client;
pub mod sender;

pub use client::{HttpClientConfig, create_client};
pub use sender::ReqwestSender;
