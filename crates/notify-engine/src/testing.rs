//! Test doubles shared by the engine test modules.

use async_trait::async_trait;
use push_gateway::{
    GatewayError, GatewayResult, MulticastMessage, MulticastResponse, PushErrorKind, PushProvider,
    SendOutcome,
};
use resident_directory::{
    ApprovalRequest, DeviceRecord, DirectoryError, DirectoryResult, DirectoryStore, NewSendLog,
    SqliteDirectory, UserRecord, WriteOp,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Provider double with per-token scripted outcomes; records every call.
pub struct ScriptedProvider {
    outcomes: HashMap<String, SendOutcome>,
    calls: Mutex<Vec<MulticastMessage>>,
}

impl ScriptedProvider {
    pub fn all_delivered() -> Self {
        Self {
            outcomes: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_token(&mut self, token: &str, kind: PushErrorKind) {
        self.outcomes
            .insert(token.to_string(), SendOutcome::Failed(kind));
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.tokens.len())
            .collect()
    }

    pub fn messages(&self) -> Vec<MulticastMessage> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushProvider for ScriptedProvider {
    async fn send_multicast(
        &self,
        message: &MulticastMessage,
    ) -> GatewayResult<MulticastResponse> {
        self.calls.lock().unwrap().push(message.clone());
        let outcomes = message
            .tokens
            .iter()
            .map(|token| {
                self.outcomes
                    .get(token)
                    .copied()
                    .unwrap_or(SendOutcome::Delivered)
            })
            .collect();
        Ok(MulticastResponse { outcomes })
    }
}

/// Provider double that fails every call at the transport level.
pub struct FailingProvider;

#[async_trait]
impl PushProvider for FailingProvider {
    async fn send_multicast(
        &self,
        _message: &MulticastMessage,
    ) -> GatewayResult<MulticastResponse> {
        Err(GatewayError::Api("scripted transport failure".to_string()))
    }
}

fn scripted_store_error() -> DirectoryError {
    DirectoryError::Connection("scripted store failure".to_string())
}

/// Store double that fails every operation.
pub struct FailingStore;

impl DirectoryStore for FailingStore {
    fn approved_active_residents(&self) -> DirectoryResult<Vec<UserRecord>> {
        Err(scripted_store_error())
    }

    fn get_user(&self, _user_id: &str) -> DirectoryResult<Option<UserRecord>> {
        Err(scripted_store_error())
    }

    fn devices_for_user(&self, _user_id: &str) -> DirectoryResult<Vec<DeviceRecord>> {
        Err(scripted_store_error())
    }

    fn get_approval_request(
        &self,
        _request_id: &str,
    ) -> DirectoryResult<Option<ApprovalRequest>> {
        Err(scripted_store_error())
    }

    fn commit_batch(&self, _ops: &[WriteOp]) -> DirectoryResult<()> {
        Err(scripted_store_error())
    }

    fn append_send_log(&self, _log: &NewSendLog) -> DirectoryResult<()> {
        Err(scripted_store_error())
    }
}

/// Store double that records committed batch sizes; reads are empty.
/// The failing variant rejects every write.
#[derive(Default)]
pub struct RecordingStore {
    fail_writes: bool,
    batches: Mutex<Vec<usize>>,
}

impl RecordingStore {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

impl DirectoryStore for RecordingStore {
    fn approved_active_residents(&self) -> DirectoryResult<Vec<UserRecord>> {
        Ok(Vec::new())
    }

    fn get_user(&self, _user_id: &str) -> DirectoryResult<Option<UserRecord>> {
        Ok(None)
    }

    fn devices_for_user(&self, _user_id: &str) -> DirectoryResult<Vec<DeviceRecord>> {
        Ok(Vec::new())
    }

    fn get_approval_request(
        &self,
        _request_id: &str,
    ) -> DirectoryResult<Option<ApprovalRequest>> {
        Ok(None)
    }

    fn commit_batch(&self, ops: &[WriteOp]) -> DirectoryResult<()> {
        self.batches.lock().unwrap().push(ops.len());
        if self.fail_writes {
            Err(scripted_store_error())
        } else {
            Ok(())
        }
    }

    fn append_send_log(&self, _log: &NewSendLog) -> DirectoryResult<()> {
        if self.fail_writes {
            Err(scripted_store_error())
        } else {
            Ok(())
        }
    }
}

/// SQLite-backed store whose device reads fail for the named users.
pub struct FlakyDeviceStore {
    inner: SqliteDirectory,
    flaky_users: HashSet<String>,
}

impl FlakyDeviceStore {
    pub fn new(inner: SqliteDirectory, flaky_users: &[&str]) -> Self {
        Self {
            inner,
            flaky_users: flaky_users.iter().map(|u| u.to_string()).collect(),
        }
    }
}

impl DirectoryStore for FlakyDeviceStore {
    fn approved_active_residents(&self) -> DirectoryResult<Vec<UserRecord>> {
        self.inner.approved_active_residents()
    }

    fn get_user(&self, user_id: &str) -> DirectoryResult<Option<UserRecord>> {
        self.inner.get_user(user_id)
    }

    fn devices_for_user(&self, user_id: &str) -> DirectoryResult<Vec<DeviceRecord>> {
        if self.flaky_users.contains(user_id) {
            return Err(scripted_store_error());
        }
        self.inner.devices_for_user(user_id)
    }

    fn get_approval_request(
        &self,
        request_id: &str,
    ) -> DirectoryResult<Option<ApprovalRequest>> {
        self.inner.get_approval_request(request_id)
    }

    fn commit_batch(&self, ops: &[WriteOp]) -> DirectoryResult<()> {
        self.inner.commit_batch(ops)
    }

    fn append_send_log(&self, log: &NewSendLog) -> DirectoryResult<()> {
        self.inner.append_send_log(log)
    }
}
