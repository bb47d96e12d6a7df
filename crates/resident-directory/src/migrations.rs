//! Database migrations.
//!
//! All SQL migrations for the directory schema. Migrations run in order and
//! are tracked in the `migrations` table.

use crate::DirectoryResult;
use rusqlite::Connection;
use tracing::info;

/// Current schema version.
pub const CURRENT_VERSION: i32 = 2;

/// Run all pending migrations.
pub fn run_migrations(conn: &Connection) -> DirectoryResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    info!(current_version, target_version = CURRENT_VERSION, "Running migrations");

    if current_version < 1 {
        migrate_v1_directory_schema(conn)?;
    }
    if current_version < 2 {
        migrate_v2_send_logs(conn)?;
    }

    Ok(())
}

fn record_migration(conn: &Connection, version: i32, name: &str) -> DirectoryResult<()> {
    conn.execute(
        "INSERT INTO migrations (version, name) VALUES (?1, ?2)",
        rusqlite::params![version, name],
    )?;
    Ok(())
}

/// v1: users, device sub-records, approval requests.
fn migrate_v1_directory_schema(conn: &Connection) -> DirectoryResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE users (
            id TEXT PRIMARY KEY,
            role TEXT NOT NULL,
            is_approved INTEGER NOT NULL DEFAULT 0,
            is_active INTEGER NOT NULL DEFAULT 1,
            categories TEXT NOT NULL DEFAULT '[]',
            push_tokens TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_users_role_flags ON users (role, is_approved, is_active);

        CREATE TABLE devices (
            user_id TEXT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            device_id TEXT NOT NULL,
            push_token TEXT NOT NULL,
            registered_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (user_id, device_id)
        );

        CREATE TABLE approval_requests (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            push_tokens TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    record_migration(conn, 1, "directory_schema")
}

/// v2: append-only dispatch summaries (counts and metadata, never tokens).
fn migrate_v2_send_logs(conn: &Connection) -> DirectoryResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE push_send_logs (
            id TEXT PRIMARY KEY,
            announcement_id TEXT NOT NULL,
            audiences TEXT NOT NULL DEFAULT '[]',
            requested_by TEXT,
            user_count INTEGER NOT NULL,
            token_count INTEGER NOT NULL,
            success_count INTEGER NOT NULL,
            failure_count INTEGER NOT NULL,
            error_counts TEXT NOT NULL DEFAULT '{}',
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            created_at_iso TEXT NOT NULL
        );
        ",
    )?;

    record_migration(conn, 2, "send_logs")
}
