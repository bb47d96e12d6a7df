//! Multicast message, outcome and classification types.

use crate::GatewayResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hard ceiling on tokens per multicast call, imposed by the provider API.
pub const MAX_TOKENS_PER_MULTICAST: usize = 500;

/// Typed per-token delivery failure kind.
///
/// The `as_str` names key the failure histogram in dispatch results and
/// send logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PushErrorKind {
    /// Token is no longer registered with the provider.
    Unregistered,
    /// Token belongs to a different sender id.
    SenderIdMismatch,
    /// Provider-side quota exhausted for now.
    QuotaExceeded,
    /// Upstream (APNs/web push) auth failure.
    ThirdPartyAuth,
    /// Provider rejected the request payload for this token.
    InvalidArgument,
    /// Provider temporarily unavailable.
    Unavailable,
    /// Catch-all for missing or unrecognized error information.
    Unknown,
}

impl PushErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unregistered => "unregistered",
            Self::SenderIdMismatch => "sender-id-mismatch",
            Self::QuotaExceeded => "quota-exceeded",
            Self::ThirdPartyAuth => "third-party-auth",
            Self::InvalidArgument => "invalid-argument",
            Self::Unavailable => "unavailable",
            Self::Unknown => "unknown",
        }
    }

    /// True for kinds that mean the token is permanently undeliverable and
    /// should be pruned from storage. Every other kind may still succeed on
    /// a later dispatch.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Unregistered | Self::SenderIdMismatch)
    }

    /// Map a provider error-code string to a kind. Unrecognized codes fall
    /// through to [`PushErrorKind::Unknown`].
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "UNREGISTERED" => Self::Unregistered,
            "SENDER_ID_MISMATCH" => Self::SenderIdMismatch,
            "QUOTA_EXCEEDED" => Self::QuotaExceeded,
            "THIRD_PARTY_AUTH_ERROR" => Self::ThirdPartyAuth,
            "INVALID_ARGUMENT" => Self::InvalidArgument,
            "UNAVAILABLE" => Self::Unavailable,
            _ => Self::Unknown,
        }
    }
}

/// Outcome of one token within a multicast call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    Failed(PushErrorKind),
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// One multicast send request: up to [`MAX_TOKENS_PER_MULTICAST`] tokens
/// plus a shared notification and string-keyed data payload.
#[derive(Debug, Clone)]
pub struct MulticastMessage {
    pub tokens: Vec<String>,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

/// Per-token outcomes of one multicast call. `outcomes` is index-aligned
/// with the submitted token list.
#[derive(Debug, Clone)]
pub struct MulticastResponse {
    pub outcomes: Vec<SendOutcome>,
}

impl MulticastResponse {
    pub fn success_count(&self) -> u32 {
        self.outcomes.iter().filter(|o| o.is_success()).count() as u32
    }

    pub fn failure_count(&self) -> u32 {
        self.outcomes.iter().filter(|o| !o.is_success()).count() as u32
    }
}

/// Push provider boundary: one multicast call, independent per-token
/// outcomes.
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Send one multicast batch.
    ///
    /// Transport-level failure of the whole call is an error; individual
    /// token failures are [`SendOutcome`]s in the response.
    async fn send_multicast(&self, message: &MulticastMessage)
        -> GatewayResult<MulticastResponse>;
}
