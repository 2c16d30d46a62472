//! PoolRoute Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout PoolRoute:
//! - Endpoint descriptors and the endpoint registry
//! - The HTTP sender trait abstraction
//! - Core error types

pub mod endpoint;
pub mod error;
pub mod sender;

pub use endpoint::{Endpoint, EndpointRegistry};
pub use error::{Error, Result, TransportError, TransportErrorKind};
pub use sender::HttpSender;
