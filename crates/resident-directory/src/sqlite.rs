//! SQLite-backed directory store.

use crate::{
    device_doc_id, migrations, ApprovalRequest, DeviceRecord, DirectoryError, DirectoryResult,
    DirectoryStore, NewApprovalRequest, NewDevice, NewSendLog, NewUser, SendLogRecord, UserRecord,
    UserRole, WriteOp,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// SQLite implementation of [`DirectoryStore`].
///
/// A single connection behind a mutex; the engine does one dispatch at a
/// time per process, so there is no contention worth a pool here.
pub struct SqliteDirectory {
    conn: Mutex<Connection>,
}

impl SqliteDirectory {
    /// Open a directory database at the given path, running migrations if needed.
    pub fn open(path: &Path) -> DirectoryResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA busy_timeout = 5000;
        ",
        )?;
        migrations::run_migrations(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory directory for testing.
    pub fn open_in_memory() -> DirectoryResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> DirectoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| DirectoryError::Connection("directory lock poisoned".to_string()))
    }

    // ==========================================
    // Host-side mutators (registration, seeding)
    // ==========================================

    /// Insert a new user document.
    pub fn insert_user(&self, user: &NewUser) -> DirectoryResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, role, is_approved, is_active, categories, push_tokens, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                user.id,
                user.role.as_str(),
                user.is_approved,
                user.is_active,
                serde_json::to_string(&user.categories)?,
                serde_json::to_string(&user.push_tokens)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Register a device sub-record; the device id is derived from the token.
    /// Re-registering the same token for a user overwrites the record.
    pub fn insert_device(&self, device: &NewDevice) -> DirectoryResult<String> {
        let device_id = device_doc_id(&device.push_token);
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO devices (user_id, device_id, push_token, registered_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                device.user_id,
                device_id,
                device.push_token,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(device_id)
    }

    /// Insert a pending approval request.
    pub fn insert_approval_request(&self, request: &NewApprovalRequest) -> DirectoryResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO approval_requests (id, user_id, push_tokens, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                request.id,
                request.user_id,
                serde_json::to_string(&request.push_tokens)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// List all send-log records, oldest first. Used by evaluation exports,
    /// never by the delivery path.
    pub fn list_send_logs(&self) -> DirectoryResult<Vec<SendLogRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, announcement_id, audiences, requested_by, user_count, token_count,
                    success_count, failure_count, error_counts, created_at, created_at_iso
             FROM push_send_logs ORDER BY rowid",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, u32>(5)?,
                row.get::<_, u32>(6)?,
                row.get::<_, u32>(7)?,
                row.get::<_, String>(8)?,
                row.get::<_, String>(9)?,
                row.get::<_, String>(10)?,
            ))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            let (
                id,
                announcement_id,
                audiences,
                requested_by,
                user_count,
                token_count,
                success_count,
                failure_count,
                error_counts,
                created_at,
                created_at_iso,
            ) = row?;
            logs.push(SendLogRecord {
                id,
                announcement_id,
                audiences: serde_json::from_str(&audiences)?,
                requested_by,
                user_count,
                token_count,
                success_count,
                failure_count,
                error_counts: serde_json::from_str(&error_counts)?,
                created_at: parse_datetime(created_at),
                created_at_iso,
            });
        }
        Ok(logs)
    }
}

const USER_COLUMNS: &str =
    "id, role, is_approved, is_active, categories, push_tokens, created_at";

type UserRow = (String, String, bool, bool, String, String, String);

fn read_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn user_from_row(raw: UserRow) -> DirectoryResult<UserRecord> {
    let (id, role, is_approved, is_active, categories, push_tokens, created_at) = raw;
    let role = UserRole::from_str(&role)
        .ok_or_else(|| DirectoryError::InvalidData(format!("unknown role '{role}' for user {id}")))?;
    Ok(UserRecord {
        id,
        role,
        is_approved,
        is_active,
        categories: serde_json::from_str(&categories)?,
        push_tokens: serde_json::from_str(&push_tokens)?,
        created_at: parse_datetime(created_at),
    })
}

impl DirectoryStore for SqliteDirectory {
    fn approved_active_residents(&self) -> DirectoryResult<Vec<UserRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE role = ?1 AND is_approved = 1 AND is_active = 1
             ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![UserRole::Resident.as_str()], read_user_row)?;
        let mut users = Vec::new();
        for row in rows {
            users.push(user_from_row(row?)?);
        }
        debug!(count = users.len(), "Queried approved active residents");
        Ok(users)
    }

    fn get_user(&self, user_id: &str) -> DirectoryResult<Option<UserRecord>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;

        match stmt.query_row(params![user_id], read_user_row) {
            Ok(raw) => Ok(Some(user_from_row(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn devices_for_user(&self, user_id: &str) -> DirectoryResult<Vec<DeviceRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT user_id, device_id, push_token, registered_at
             FROM devices WHERE user_id = ?1 ORDER BY device_id",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut devices = Vec::new();
        for row in rows {
            let (user_id, device_id, push_token, registered_at) = row?;
            devices.push(DeviceRecord {
                user_id,
                device_id,
                push_token,
                registered_at: parse_datetime(registered_at),
            });
        }
        Ok(devices)
    }

    fn get_approval_request(
        &self,
        request_id: &str,
    ) -> DirectoryResult<Option<ApprovalRequest>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, push_tokens, created_at FROM approval_requests WHERE id = ?1",
        )?;

        let result = stmt.query_row(params![request_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        });

        match result {
            Ok((id, user_id, push_tokens, created_at)) => Ok(Some(ApprovalRequest {
                id,
                user_id,
                push_tokens: serde_json::from_str(&push_tokens)?,
                created_at: parse_datetime(created_at),
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn commit_batch(&self, ops: &[WriteOp]) -> DirectoryResult<()> {
        if ops.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;

        for op in ops {
            match op {
                WriteOp::RemoveUserToken { user_id, token } => {
                    let stored = tx.query_row(
                        "SELECT push_tokens FROM users WHERE id = ?1",
                        params![user_id],
                        |row| row.get::<_, String>(0),
                    );
                    let raw = match stored {
                        Ok(raw) => raw,
                        // Removing a stale token from a vanished user is a no-op.
                        Err(rusqlite::Error::QueryReturnedNoRows) => continue,
                        Err(e) => return Err(e.into()),
                    };

                    let mut tokens: Vec<String> = serde_json::from_str(&raw)?;
                    let before = tokens.len();
                    tokens.retain(|t| t != token);
                    if tokens.len() != before {
                        tx.execute(
                            "UPDATE users SET push_tokens = ?1 WHERE id = ?2",
                            params![serde_json::to_string(&tokens)?, user_id],
                        )?;
                    }
                }
                WriteOp::DeleteDevice { user_id, device_id } => {
                    tx.execute(
                        "DELETE FROM devices WHERE user_id = ?1 AND device_id = ?2",
                        params![user_id, device_id],
                    )?;
                }
            }
        }

        tx.commit()?;
        debug!(ops = ops.len(), "Committed write batch");
        Ok(())
    }

    fn append_send_log(&self, log: &NewSendLog) -> DirectoryResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO push_send_logs (id, announcement_id, audiences, requested_by,
                user_count, token_count, success_count, failure_count, error_counts,
                created_at, created_at_iso)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                log.id,
                log.announcement_id,
                serde_json::to_string(&log.audiences)?,
                log.requested_by,
                log.user_count,
                log.token_count,
                log.success_count,
                log.failure_count,
                serde_json::to_string(&log.error_counts)?,
                Utc::now().to_rfc3339(),
                log.created_at_iso,
            ],
        )?;
        Ok(())
    }
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
