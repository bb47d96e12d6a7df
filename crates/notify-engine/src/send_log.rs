//! Append-only dispatch summaries.

use crate::DispatchResult;
use chrono::Utc;
use resident_directory::{DirectoryStore, NewSendLog};
use tracing::warn;

/// Append the send-log record for an announcement dispatch.
///
/// The record carries aggregate counts and metadata only; raw tokens never
/// reach the log. The dispatch already happened, so a failed append is
/// logged and does not affect the returned result.
pub fn record_announcement_send<D: DirectoryStore>(
    store: &D,
    announcement_id: &str,
    audiences: &[String],
    requested_by: Option<&str>,
    result: &DispatchResult,
) {
    let log = NewSendLog {
        id: uuid::Uuid::new_v4().to_string(),
        announcement_id: announcement_id.to_string(),
        audiences: audiences.to_vec(),
        requested_by: requested_by.map(str::to_string),
        user_count: result.user_count,
        token_count: result.token_count,
        success_count: result.success_count,
        failure_count: result.failure_count,
        error_counts: result.error_counts.clone(),
        created_at_iso: Utc::now().to_rfc3339(),
    };

    if let Err(e) = store.append_send_log(&log) {
        warn!(announcement_id = %announcement_id, error = %e, "Send log append failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingStore;
    use resident_directory::SqliteDirectory;
    use std::collections::BTreeMap;

    fn sample_result() -> DispatchResult {
        let mut error_counts = BTreeMap::new();
        error_counts.insert("unregistered".to_string(), 2u32);
        DispatchResult {
            user_count: 7,
            token_count: 9,
            success_count: 7,
            failure_count: 2,
            error_counts,
        }
    }

    #[test]
    fn test_appends_counts_and_metadata() {
        let store = SqliteDirectory::open_in_memory().unwrap();
        record_announcement_send(
            &store,
            "ann-1",
            &["General Residents".to_string()],
            Some("admin-1"),
            &sample_result(),
        );

        let logs = store.list_send_logs().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].announcement_id, "ann-1");
        assert_eq!(logs[0].user_count, 7);
        assert_eq!(logs[0].token_count, 9);
        assert_eq!(logs[0].error_counts["unregistered"], 2);
        assert!(!logs[0].created_at_iso.is_empty());
    }

    #[test]
    fn test_append_failure_is_swallowed() {
        let store = RecordingStore::failing();
        // Must not panic; the failure is only logged.
        record_announcement_send(&store, "ann-1", &[], None, &sample_result());
    }
}
