//! Dispatch orchestration.

use crate::{
    collect_tokens, dispatch_to_tokens, normalize_audiences, prune_invalid_tokens,
    record_announcement_send, resolve_audience, NotifyResult,
};
use push_gateway::PushProvider;
use resident_directory::DirectoryStore;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// An announcement push request.
#[derive(Debug, Clone)]
pub struct AnnouncementPush {
    pub announcement_id: String,
    pub title: String,
    pub body: String,
    /// Audience labels selected by the admin.
    pub audiences: Vec<String>,
    /// Admin user id, recorded in the send log.
    pub requested_by: Option<String>,
    /// Extra string data forwarded to clients.
    pub data: Option<BTreeMap<String, String>>,
}

/// An account-approval push request (single user).
#[derive(Debug, Clone)]
pub struct ApprovalPush {
    pub request_id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
}

/// Aggregate outcome of an announcement dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchResult {
    pub user_count: u32,
    pub token_count: u32,
    pub success_count: u32,
    pub failure_count: u32,
    /// Failure-kind name -> occurrence count.
    pub error_counts: BTreeMap<String, u32>,
}

/// Aggregate outcome of an account-approval dispatch. Always exactly one
/// user, so there is no user count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalDispatchResult {
    pub token_count: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub error_counts: BTreeMap<String, u32>,
}

/// Targeted push delivery engine.
///
/// One instance per process; each dispatch call runs on a single logical
/// task and holds no cross-request state beyond the store and provider
/// clients it was built with.
pub struct NotifyEngine<D, P> {
    store: D,
    provider: P,
}

impl<D: DirectoryStore, P: PushProvider> NotifyEngine<D, P> {
    pub fn new(store: D, provider: P) -> Self {
        Self { store, provider }
    }

    /// Send an announcement notification to the targeted audience.
    ///
    /// Resolves the audience, aggregates tokens from both storage schemas,
    /// dispatches in provider-sized batches, prunes tokens reported
    /// permanently invalid, and records a counts-only send log. Audience
    /// resolution failures propagate; pruning and logging are best-effort.
    pub async fn send_announcement(
        &self,
        push: &AnnouncementPush,
    ) -> NotifyResult<DispatchResult> {
        let audiences = normalize_audiences(&push.audiences);
        let users = resolve_audience(&self.store, &audiences)?;
        info!(
            announcement_id = %push.announcement_id,
            audiences = ?audiences,
            matched_users = users.len(),
            "Announcement push"
        );

        let token_set = collect_tokens(&self.store, &users);
        info!(
            tokens = token_set.tokens.len(),
            users = users.len(),
            "Collected push tokens"
        );

        if token_set.tokens.is_empty() {
            let result = DispatchResult {
                user_count: users.len() as u32,
                token_count: 0,
                success_count: 0,
                failure_count: 0,
                error_counts: BTreeMap::new(),
            };
            record_announcement_send(
                &self.store,
                &push.announcement_id,
                &audiences,
                push.requested_by.as_deref(),
                &result,
            );
            return Ok(result);
        }

        let mut data = BTreeMap::new();
        data.insert("type".to_string(), "announcement".to_string());
        data.insert(
            "announcementId".to_string(),
            push.announcement_id.clone(),
        );
        if let Some(extra) = &push.data {
            for (key, value) in extra {
                data.insert(key.clone(), value.clone());
            }
        }

        let totals = dispatch_to_tokens(
            &self.provider,
            &token_set.tokens,
            &push.title,
            &push.body,
            &data,
        )
        .await?;

        prune_invalid_tokens(&self.store, &token_set, &totals.invalid_tokens);

        let result = DispatchResult {
            user_count: users.len() as u32,
            token_count: token_set.tokens.len() as u32,
            success_count: totals.success_count,
            failure_count: totals.failure_count,
            error_counts: totals.error_counts,
        };
        record_announcement_send(
            &self.store,
            &push.announcement_id,
            &audiences,
            push.requested_by.as_deref(),
            &result,
        );
        Ok(result)
    }

    /// Send an account-approved notification to one user's devices.
    pub async fn send_account_approval(
        &self,
        push: &ApprovalPush,
    ) -> NotifyResult<ApprovalDispatchResult> {
        let tokens = self.approval_tokens(&push.request_id, &push.user_id)?;

        if tokens.is_empty() {
            return Ok(ApprovalDispatchResult {
                token_count: 0,
                success_count: 0,
                failure_count: 0,
                error_counts: BTreeMap::new(),
            });
        }

        let mut data = BTreeMap::new();
        data.insert("type".to_string(), "account_approved".to_string());
        data.insert("userId".to_string(), push.user_id.clone());

        let totals =
            dispatch_to_tokens(&self.provider, &tokens, &push.title, &push.body, &data).await?;

        Ok(ApprovalDispatchResult {
            token_count: tokens.len() as u32,
            success_count: totals.success_count,
            failure_count: totals.failure_count,
            error_counts: totals.error_counts,
        })
    }

    /// Tokens for an approval push: the approval-request document first,
    /// the user document only when that yields nothing.
    fn approval_tokens(&self, request_id: &str, user_id: &str) -> NotifyResult<Vec<String>> {
        let mut tokens: Vec<String> = Vec::new();

        let request_id = request_id.trim();
        if !request_id.is_empty() {
            if let Some(request) = self.store.get_approval_request(request_id)? {
                push_unique(&mut tokens, &request.push_tokens);
            }
        }

        let user_id = user_id.trim();
        if tokens.is_empty() && !user_id.is_empty() {
            if let Some(user) = self.store.get_user(user_id)? {
                push_unique(&mut tokens, &user.push_tokens);
            }
        }

        if tokens.is_empty() {
            // The user either never applied with a device or has not opened
            // the app since approval; there is nowhere to deliver to.
            warn!(request_id, user_id, "No push tokens for account approval");
        }
        Ok(tokens)
    }
}

fn push_unique(tokens: &mut Vec<String>, raw: &[String]) {
    for token in raw {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
}
