//! Best-effort invalid-token pruning.

use crate::TokenSet;
use resident_directory::{device_doc_id, DirectoryStore, WriteOp};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Conservative ceiling on operations per atomic write batch, comfortably
/// under the store's batch-size limit.
pub const MAX_WRITE_OPS_PER_BATCH: usize = 450;

/// Remove permanently-invalid tokens from both storage schemas.
///
/// For every owner of every invalid token this queues one array removal and
/// one device-record delete, flushing an atomic batch whenever the ceiling
/// is reached. Cleanup only: failures are logged, never surfaced, and a
/// failed flush does not stop the remaining batches.
pub fn prune_invalid_tokens<D: DirectoryStore>(
    store: &D,
    tokens: &TokenSet,
    invalid: &BTreeSet<String>,
) {
    if invalid.is_empty() {
        return;
    }

    let mut ops: Vec<WriteOp> = Vec::new();
    let mut total = 0usize;

    for token in invalid {
        let Some(owner_ids) = tokens.owners.get(token) else {
            continue;
        };
        for user_id in owner_ids {
            ops.push(WriteOp::RemoveUserToken {
                user_id: user_id.clone(),
                token: token.clone(),
            });
            ops.push(WriteOp::DeleteDevice {
                user_id: user_id.clone(),
                device_id: device_doc_id(token),
            });
            if ops.len() >= MAX_WRITE_OPS_PER_BATCH {
                total += ops.len();
                flush(store, &mut ops);
            }
        }
    }

    total += ops.len();
    flush(store, &mut ops);
    debug!(invalid = invalid.len(), ops = total, "Pruned invalid tokens");
}

fn flush<D: DirectoryStore>(store: &D, ops: &mut Vec<WriteOp>) {
    if ops.is_empty() {
        return;
    }
    if let Err(e) = store.commit_batch(ops) {
        warn!(ops = ops.len(), error = %e, "Token prune batch failed");
    }
    ops.clear();
}
