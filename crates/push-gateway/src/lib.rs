//! Push provider boundary for multicast delivery.
//!
//! This crate provides:
//! - PushProvider: the multicast-send seam the delivery engine targets
//! - MulticastMessage / MulticastResponse with independent per-token outcomes
//! - PushErrorKind: typed per-token failure classification
//! - HttpPushGateway: HTTP implementation with bearer auth

mod error;
mod http;
mod provider;

pub use error::{GatewayError, GatewayResult};
pub use http::{GatewayConfig, HttpPushGateway};
pub use provider::{
    MulticastMessage, MulticastResponse, PushErrorKind, PushProvider, SendOutcome,
    MAX_TOKENS_PER_MULTICAST,
};
