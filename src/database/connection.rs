//! SQLite connection management for the link store.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use super::migrations;

/// How long a writer waits on a lock held by another process (e.g. a running
/// `serve` while `import` is invoked from a second shell).
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Owns the SQLite connection holding profiles, deeplinks and tags.
///
/// The connection is not `Sync`; callers that share a `Database` across
/// threads wrap it in a `Mutex` (see [`crate::app::App`]).
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the link store at `path` and brings its schema up to date.
    ///
    /// # Errors
    /// Returns `rusqlite::Error` if the file cannot be opened or a migration fails.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, rusqlite::Error> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Self::prepare(conn)
    }

    /// In-memory store, discarded on drop.
    pub fn open_in_memory() -> Result<Self, rusqlite::Error> {
        Self::prepare(Connection::open_in_memory()?)
    }

    fn prepare(conn: Connection) -> Result<Self, rusqlite::Error> {
        migrations::run_all(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
