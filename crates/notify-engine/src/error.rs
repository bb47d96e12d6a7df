//! Engine error types.

use thiserror::Error;

/// Engine error type.
///
/// Only faults that prevent computing a meaningful dispatch result surface
/// here; best-effort stages (device sub-record reads, pruning, send-log
/// appends) log and degrade instead.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Directory store error
    #[error("Directory error: {0}")]
    Directory(#[from] resident_directory::DirectoryError),

    /// Push gateway error
    #[error("Gateway error: {0}")]
    Gateway(#[from] push_gateway::GatewayError),
}

/// Result type alias using NotifyError.
pub type NotifyResult<T> = Result<T, NotifyError>;
