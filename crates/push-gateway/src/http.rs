//! HTTP multicast client.

use crate::{
    GatewayError, GatewayResult, MulticastMessage, MulticastResponse, PushErrorKind, PushProvider,
    SendOutcome, MAX_TOKENS_PER_MULTICAST,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the push provider API.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://push.linkod.app".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Request payload for one multicast call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MulticastRequest<'a> {
    tokens: &'a [String],
    notification: NotificationPayload<'a>,
    data: &'a BTreeMap<String, String>,
}

/// Title/body pair shown by the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationPayload<'a> {
    title: &'a str,
    body: &'a str,
}

/// Response from the provider: one result per submitted token, in order.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MulticastApiResponse {
    results: Vec<TokenResult>,
}

/// Per-token result in the provider response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResult {
    success: bool,
    #[serde(default)]
    error_code: Option<String>,
}

/// HTTP implementation of [`PushProvider`].
pub struct HttpPushGateway {
    config: GatewayConfig,
    client: Client,
    auth_token: String,
}

impl HttpPushGateway {
    /// Create a new gateway client authenticating with the given bearer token.
    pub fn new(config: GatewayConfig, auth_token: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            auth_token: auth_token.to_string(),
        }
    }
}

#[async_trait]
impl PushProvider for HttpPushGateway {
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> GatewayResult<MulticastResponse> {
        if message.tokens.len() > MAX_TOKENS_PER_MULTICAST {
            return Err(GatewayError::BatchTooLarge(message.tokens.len()));
        }

        let url = format!("{}/v1/multicast", self.config.endpoint);
        let request = MulticastRequest {
            tokens: &message.tokens,
            notification: NotificationPayload {
                title: &message.title,
                body: &message.body,
            },
            data: &message.data,
        };

        debug!(url = %url, tokens = message.tokens.len(), "Sending multicast");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.auth_token))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api(format!("HTTP {status}: {body}")));
        }

        let api_response: MulticastApiResponse = response.json().await?;
        if api_response.results.len() != message.tokens.len() {
            return Err(GatewayError::Api(format!(
                "result count mismatch: {} results for {} tokens",
                api_response.results.len(),
                message.tokens.len()
            )));
        }

        let outcomes = api_response
            .results
            .into_iter()
            .map(|result| {
                if result.success {
                    SendOutcome::Delivered
                } else {
                    // Missing error information counts as the catch-all kind.
                    SendOutcome::Failed(
                        result
                            .error_code
                            .as_deref()
                            .map(PushErrorKind::from_code)
                            .unwrap_or(PushErrorKind::Unknown),
                    )
                }
            })
            .collect();

        Ok(MulticastResponse { outcomes })
    }
}
