//! Cross-schema token aggregation.

use resident_directory::{DirectoryResult, DirectoryStore, UserRecord};
use std::collections::{BTreeSet, HashMap};
use tracing::warn;

/// Deduplicated push tokens plus the token -> owners reverse index.
///
/// The index always carries every owner of a token across both storage
/// schemas, so downstream pruning never misses one.
#[derive(Debug, Default)]
pub struct TokenSet {
    /// Unique tokens in first-seen order.
    pub tokens: Vec<String>,
    /// Owning user ids per token.
    pub owners: HashMap<String, BTreeSet<String>>,
}

impl TokenSet {
    fn insert(&mut self, token: &str, user_id: &str) {
        let token = token.trim();
        if token.is_empty() {
            return;
        }
        if !self.owners.contains_key(token) {
            self.tokens.push(token.to_string());
        }
        self.owners
            .entry(token.to_string())
            .or_default()
            .insert(user_id.to_string());
    }
}

/// One storage schema holding push tokens for a user.
pub trait TokenSource {
    /// Schema name, used when logging a failed read.
    fn name(&self) -> &'static str;

    /// Tokens this schema holds for the user.
    fn tokens_for(
        &self,
        store: &dyn DirectoryStore,
        user: &UserRecord,
    ) -> DirectoryResult<Vec<String>>;
}

/// Flat token array on the user document. The record is already fetched,
/// so this source never touches the store.
pub struct ArrayFieldSource;

impl TokenSource for ArrayFieldSource {
    fn name(&self) -> &'static str {
        "user-token-array"
    }

    fn tokens_for(
        &self,
        _store: &dyn DirectoryStore,
        user: &UserRecord,
    ) -> DirectoryResult<Vec<String>> {
        Ok(user.push_tokens.clone())
    }
}

/// Per-device sub-records; one store query per user.
pub struct DeviceRecordSource;

impl TokenSource for DeviceRecordSource {
    fn name(&self) -> &'static str {
        "device-records"
    }

    fn tokens_for(
        &self,
        store: &dyn DirectoryStore,
        user: &UserRecord,
    ) -> DirectoryResult<Vec<String>> {
        Ok(store
            .devices_for_user(&user.id)?
            .into_iter()
            .map(|device| device.push_token)
            .collect())
    }
}

/// Collect the tokens of every user from every schema.
///
/// Best-effort per user and source: a failed read is logged and skipped so
/// one unreadable user cannot block notifying everyone else.
pub fn collect_tokens<D: DirectoryStore>(store: &D, users: &[UserRecord]) -> TokenSet {
    let sources: [&dyn TokenSource; 2] = [&ArrayFieldSource, &DeviceRecordSource];
    let mut set = TokenSet::default();

    for user in users {
        for source in sources {
            match source.tokens_for(store, user) {
                Ok(tokens) => {
                    for token in &tokens {
                        set.insert(token, &user.id);
                    }
                }
                Err(e) => {
                    warn!(
                        user_id = %user.id,
                        source = source.name(),
                        error = %e,
                        "Token source read failed"
                    );
                }
            }
        }
    }

    set
}
