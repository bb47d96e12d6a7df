//! Batched multicast dispatch.

use push_gateway::{
    GatewayResult, MulticastMessage, PushErrorKind, PushProvider, SendOutcome,
    MAX_TOKENS_PER_MULTICAST,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Accumulated outcome of a dispatch: counts, the failure histogram and the
/// tokens the provider reported permanently invalid.
///
/// [`DispatchTotals::absorb`] is associative, so per-batch outcomes can be
/// folded in any grouping without changing the totals. A bounded-parallel
/// sender would be a drop-in replacement for the sequential loop below.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchTotals {
    pub success_count: u32,
    pub failure_count: u32,
    /// Failure-kind name -> occurrence count.
    pub error_counts: BTreeMap<String, u32>,
    /// Tokens to hand to the pruner.
    pub invalid_tokens: BTreeSet<String>,
}

impl DispatchTotals {
    /// Fold another outcome into this one.
    pub fn absorb(&mut self, other: DispatchTotals) {
        self.success_count += other.success_count;
        self.failure_count += other.failure_count;
        for (kind, count) in other.error_counts {
            *self.error_counts.entry(kind).or_insert(0) += count;
        }
        self.invalid_tokens.extend(other.invalid_tokens);
    }

    fn record_failure(&mut self, token: &str, kind: PushErrorKind) {
        self.failure_count += 1;
        *self
            .error_counts
            .entry(kind.as_str().to_string())
            .or_insert(0) += 1;
        if kind.is_permanent() {
            self.invalid_tokens.insert(token.to_string());
        }
    }
}

/// Send one notification to every token, in provider-sized batches.
///
/// Batches are issued sequentially; batch N+1 only goes out after batch N
/// completes. An empty token list returns zero totals without a provider
/// call. A transport-level failure of any batch propagates.
pub async fn dispatch_to_tokens<P: PushProvider>(
    provider: &P,
    tokens: &[String],
    title: &str,
    body: &str,
    data: &BTreeMap<String, String>,
) -> GatewayResult<DispatchTotals> {
    let mut totals = DispatchTotals::default();

    for batch in tokens.chunks(MAX_TOKENS_PER_MULTICAST) {
        let message = MulticastMessage {
            tokens: batch.to_vec(),
            title: title.to_string(),
            body: body.to_string(),
            data: data.clone(),
        };
        let response = provider.send_multicast(&message).await?;

        let mut batch_totals = DispatchTotals::default();
        for (token, outcome) in batch.iter().zip(response.outcomes.iter()) {
            match outcome {
                SendOutcome::Delivered => batch_totals.success_count += 1,
                SendOutcome::Failed(kind) => batch_totals.record_failure(token, *kind),
            }
        }

        debug!(
            tokens = batch.len(),
            success = batch_totals.success_count,
            failure = batch_totals.failure_count,
            "Multicast batch complete"
        );
        totals.absorb(batch_totals);
    }

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedProvider;

    fn tokens(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("tok-{i}")).collect()
    }

    #[tokio::test]
    async fn test_empty_token_list_makes_no_call() {
        let provider = ScriptedProvider::all_delivered();
        let totals = dispatch_to_tokens(&provider, &[], "t", "b", &BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(totals, DispatchTotals::default());
        assert!(provider.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_partitions_into_provider_sized_batches() {
        let provider = ScriptedProvider::all_delivered();
        let tokens = tokens(1203);

        let totals = dispatch_to_tokens(&provider, &tokens, "t", "b", &BTreeMap::new())
            .await
            .unwrap();

        // ceil(1203 / 500) calls, each within the limit, covering every token.
        assert_eq!(provider.batch_sizes(), vec![500, 500, 203]);
        assert_eq!(totals.success_count + totals.failure_count, 1203);
        assert_eq!(totals.failure_count, 0);
    }

    #[tokio::test]
    async fn test_failure_histogram_and_invalid_set() {
        let mut provider = ScriptedProvider::all_delivered();
        // 20 failures in a full batch of 500: 5 unregistered, 15 assorted.
        for i in 0..5 {
            provider.fail_token(&format!("tok-{i}"), PushErrorKind::Unregistered);
        }
        for i in 5..15 {
            provider.fail_token(&format!("tok-{i}"), PushErrorKind::QuotaExceeded);
        }
        for i in 15..20 {
            provider.fail_token(&format!("tok-{i}"), PushErrorKind::Unknown);
        }

        let totals = dispatch_to_tokens(&provider, &tokens(500), "t", "b", &BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(totals.success_count, 480);
        assert_eq!(totals.failure_count, 20);
        assert_eq!(totals.error_counts["unregistered"], 5);
        assert_eq!(totals.error_counts["quota-exceeded"], 10);
        assert_eq!(totals.error_counts["unknown"], 5);

        // Exactly the permanently-invalid tokens are queued for pruning.
        let expected: BTreeSet<String> = (0..5).map(|i| format!("tok-{i}")).collect();
        assert_eq!(totals.invalid_tokens, expected);
    }

    #[tokio::test]
    async fn test_counts_accumulate_across_batches() {
        let mut provider = ScriptedProvider::all_delivered();
        provider.fail_token("tok-0", PushErrorKind::Unregistered);
        provider.fail_token("tok-700", PushErrorKind::SenderIdMismatch);

        let totals = dispatch_to_tokens(&provider, &tokens(800), "t", "b", &BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(provider.batch_sizes(), vec![500, 300]);
        assert_eq!(totals.success_count, 798);
        assert_eq!(totals.failure_count, 2);
        assert_eq!(totals.invalid_tokens.len(), 2);
    }

    #[test]
    fn test_absorb_is_associative() {
        let mut a = DispatchTotals::default();
        a.success_count = 3;
        a.record_failure("tok-a", PushErrorKind::Unregistered);

        let mut b = DispatchTotals::default();
        b.success_count = 2;
        b.record_failure("tok-b", PushErrorKind::QuotaExceeded);

        let mut c = DispatchTotals::default();
        c.record_failure("tok-c", PushErrorKind::Unregistered);

        // (a + b) + c
        let mut left = a.clone();
        left.absorb(b.clone());
        left.absorb(c.clone());

        // a + (b + c)
        let mut right_inner = b;
        right_inner.absorb(c);
        let mut right = a;
        right.absorb(right_inner);

        assert_eq!(left, right);
        assert_eq!(left.error_counts["unregistered"], 2);
    }
}
