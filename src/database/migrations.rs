//! Schema migrations for the link store.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Profile seeded by the first migration; every fresh install owns it.
pub const DEFAULT_PROFILE_ID: i64 = 1;

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// # Errors
/// Returns `rusqlite::Error` if any SQL statement fails.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: profiles, deeplinks, tags")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Index tag joins and favourite links")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: profiles, deeplinks, tags and the link/tag join.
///
/// `UNIQUE(profile_id, link)` is what keeps two concurrent imports from
/// inserting the same link twice; the loser of the race hits the constraint
/// and is counted as skipped.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS profiles (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            created_at INTEGER NOT NULL
        );

        INSERT OR IGNORE INTO profiles (id, name, created_at) VALUES (1, 'Default', 0);

        CREATE TABLE IF NOT EXISTS deeplinks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            link TEXT NOT NULL,
            name TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            thumbnail TEXT NOT NULL DEFAULT '',
            opened_count INTEGER NOT NULL DEFAULT 0 CHECK (opened_count >= 0),
            is_favourite INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            last_opened_at INTEGER,
            profile_id INTEGER NOT NULL,
            UNIQUE (profile_id, link),
            FOREIGN KEY (profile_id) REFERENCES profiles(id) ON DELETE CASCADE
        );

        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS deeplink_tags (
            deeplink_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (deeplink_id, tag_id),
            FOREIGN KEY (deeplink_id) REFERENCES deeplinks(id) ON DELETE CASCADE,
            FOREIGN KEY (tag_id) REFERENCES tags(id) ON DELETE CASCADE
        );
        ",
    )
}

/// V2: lookup indexes for tag usage counts and the favourites filter.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE INDEX IF NOT EXISTS idx_deeplink_tags_tag ON deeplink_tags(tag_id);
        CREATE INDEX IF NOT EXISTS idx_deeplinks_favourite ON deeplinks(profile_id, is_favourite);
        ",
    )
}
