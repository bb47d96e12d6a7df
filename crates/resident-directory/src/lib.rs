//! User directory layer for targeted push delivery.
//!
//! This crate provides:
//! - DirectoryStore: the document-store boundary consumed by the delivery engine
//! - Record models for users, devices, approval requests and send logs
//! - WriteOp: the unit of atomic batched writes (token pruning)
//! - SqliteDirectory: SQLite-backed implementation with migrations
//!
//! The delivery engine only ever talks to the [`DirectoryStore`] trait; the
//! SQLite implementation here is what the admin tooling runs against locally.

mod error;
mod migrations;
mod models;
mod sqlite;
mod store;

pub use error::{DirectoryError, DirectoryResult};
pub use migrations::run_migrations;
pub use models::{
    device_doc_id, ApprovalRequest, DeviceRecord, NewApprovalRequest, NewDevice, NewSendLog,
    NewUser, SendLogRecord, UserRecord, UserRole,
};
pub use sqlite::SqliteDirectory;
pub use store::{DirectoryStore, WriteOp};
