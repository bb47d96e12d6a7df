//! Gateway error types.

use thiserror::Error;

/// Gateway error type.
///
/// These cover failures of a whole multicast call; per-token delivery
/// failures are [`crate::SendOutcome`] data, never errors.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider API error
    #[error("Provider API error: {0}")]
    Api(String),

    /// Batch exceeds the provider multicast limit
    #[error("Multicast batch too large: {0} tokens")]
    BatchTooLarge(usize),
}

/// Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;
