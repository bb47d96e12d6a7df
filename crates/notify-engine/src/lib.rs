//! Targeted push delivery engine.
//!
//! Takes caller-supplied audience labels and a notification, resolves the
//! audience against the user directory, aggregates per-device push tokens
//! across both storage schemas, dispatches provider-sized multicast batches,
//! prunes tokens the provider reports as permanently invalid, and records an
//! append-only summary of every dispatch.
//!
//! The stages are deliberately independent functions composed by
//! [`NotifyEngine`]:
//!
//! - [`resolve_audience`]: audience labels -> user records (read-only)
//! - [`collect_tokens`]: user records -> unique tokens + ownership index
//! - [`dispatch_to_tokens`]: tokens -> per-batch send with failure histogram
//! - [`prune_invalid_tokens`]: best-effort cleanup, never surfaces errors
//! - [`record_announcement_send`]: counts-only send log, never raw tokens

mod audience;
mod dispatch;
mod engine;
mod error;
mod prune;
mod send_log;
mod tokens;

#[cfg(test)]
mod testing;

pub use audience::{normalize_audiences, resolve_audience, GENERAL_AUDIENCE};
pub use dispatch::{dispatch_to_tokens, DispatchTotals};
pub use engine::{
    AnnouncementPush, ApprovalDispatchResult, ApprovalPush, DispatchResult, NotifyEngine,
};
pub use error::{NotifyError, NotifyResult};
pub use prune::{prune_invalid_tokens, MAX_WRITE_OPS_PER_BATCH};
pub use send_log::record_announcement_send;
pub use tokens::{collect_tokens, ArrayFieldSource, DeviceRecordSource, TokenSet, TokenSource};
