//! Directory store access boundary.

use crate::{ApprovalRequest, DeviceRecord, DirectoryResult, NewSendLog, UserRecord};

/// A single queued write against the directory.
///
/// Slices passed to [`DirectoryStore::commit_batch`] are applied atomically:
/// either every operation lands or none do. Both variants only ever remove
/// data, so a batch is safe to race against unrelated writers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOp {
    /// Remove one token from the user's flat token array.
    RemoveUserToken { user_id: String, token: String },
    /// Delete one device sub-record.
    DeleteDevice { user_id: String, device_id: String },
}

/// Read/write surface of the user directory.
///
/// The delivery engine consumes this trait only; implementations decide
/// where documents actually live.
pub trait DirectoryStore: Send + Sync {
    /// All users with role resident that are approved and active. This is
    /// the one filtered query audience resolution starts from.
    fn approved_active_residents(&self) -> DirectoryResult<Vec<UserRecord>>;

    /// Read one user document by id.
    fn get_user(&self, user_id: &str) -> DirectoryResult<Option<UserRecord>>;

    /// Read the device sub-records of one user.
    fn devices_for_user(&self, user_id: &str) -> DirectoryResult<Vec<DeviceRecord>>;

    /// Read one pending approval request by id.
    fn get_approval_request(&self, request_id: &str)
        -> DirectoryResult<Option<ApprovalRequest>>;

    /// Apply a batch of write operations atomically.
    ///
    /// Callers are responsible for keeping batches under the store's
    /// operation-count limit.
    fn commit_batch(&self, ops: &[WriteOp]) -> DirectoryResult<()>;

    /// Append one send-log record. The store assigns the server timestamp.
    fn append_send_log(&self, log: &NewSendLog) -> DirectoryResult<()>;
}
