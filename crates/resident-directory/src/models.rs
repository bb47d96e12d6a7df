//! Directory record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Role of a directory user.
///
/// The directory is shared with the rest of the platform; announcement
/// delivery only ever targets residents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Resident,
    Official,
    Staff,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resident => "resident",
            Self::Official => "official",
            Self::Staff => "staff",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// Parse a stored role string. Unknown strings are rejected rather than
    /// silently mapped to some default role.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "resident" => Some(Self::Resident),
            "official" => Some(Self::Official),
            "staff" => Some(Self::Staff),
            "admin" => Some(Self::Admin),
            "super_admin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }
}

/// User document.
///
/// `push_tokens` is the flat token-array field written by the desktop app;
/// mobile devices register per-device sub-records instead (see
/// [`DeviceRecord`]). Both are token sources for delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub role: UserRole,
    pub is_approved: bool,
    pub is_active: bool,
    /// Audience category labels this user belongs to.
    pub categories: Vec<String>,
    /// Flat token array (may be empty).
    pub push_tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for a user document.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub role: UserRole,
    pub is_approved: bool,
    pub is_active: bool,
    pub categories: Vec<String>,
    pub push_tokens: Vec<String>,
}

/// Device sub-record of a user.
///
/// `device_id` is always [`device_doc_id`] of the token, so registration and
/// pruning derive the same document id independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub user_id: String,
    pub device_id: String,
    pub push_token: String,
    pub registered_at: DateTime<Utc>,
}

/// Insert shape for a device sub-record. The device id is derived.
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub user_id: String,
    pub push_token: String,
}

/// Pending signup document, consulted first for account-approval pushes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub id: String,
    pub user_id: String,
    /// Tokens captured when the user applied (may be empty).
    pub push_tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert shape for an approval request.
#[derive(Debug, Clone)]
pub struct NewApprovalRequest {
    pub id: String,
    pub user_id: String,
    pub push_tokens: Vec<String>,
}

/// Insert shape for one send-log record.
///
/// Holds aggregate counts and metadata only; raw tokens are deliberately
/// not representable here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSendLog {
    pub id: String,
    pub announcement_id: String,
    pub audiences: Vec<String>,
    pub requested_by: Option<String>,
    pub user_count: u32,
    pub token_count: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub error_counts: BTreeMap<String, u32>,
    /// Client-computed ISO timestamp, for offline export alongside the
    /// server-assigned `created_at`.
    pub created_at_iso: String,
}

/// Stored send-log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendLogRecord {
    pub id: String,
    pub announcement_id: String,
    pub audiences: Vec<String>,
    pub requested_by: Option<String>,
    pub user_count: u32,
    pub token_count: u32,
    pub success_count: u32,
    pub failure_count: u32,
    pub error_counts: BTreeMap<String, u32>,
    /// Server-assigned timestamp.
    pub created_at: DateTime<Utc>,
    pub created_at_iso: String,
}

/// Deterministic device-document id for a push token.
///
/// First 8 bytes of SHA-256 as lowercase hex (16 chars, fixed width).
/// Device registration and token pruning must agree on this encoding.
pub fn device_doc_id(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    digest[..8].iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_doc_id_deterministic() {
        let a = device_doc_id("token-abc");
        let b = device_doc_id("token-abc");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_device_doc_id_distinct_tokens() {
        assert_ne!(device_doc_id("token-a"), device_doc_id("token-b"));
    }

    #[test]
    fn test_user_role_round_trip() {
        for role in [
            UserRole::Resident,
            UserRole::Official,
            UserRole::Staff,
            UserRole::Admin,
            UserRole::SuperAdmin,
        ] {
            assert_eq!(UserRole::from_str(role.as_str()), Some(role));
        }
    }

    #[test]
    fn test_user_role_unknown_rejected() {
        assert_eq!(UserRole::from_str("moderator"), None);
        assert_eq!(UserRole::from_str(""), None);
    }
}
