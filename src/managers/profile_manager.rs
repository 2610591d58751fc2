//! Profile Manager: named partitions of the link collection.

use rusqlite::{params, Connection, ErrorCode};

use crate::types::errors::ProfileError;
use crate::types::profile::Profile;

pub trait ProfileManagerTrait {
    fn create_profile(&mut self, name: &str) -> Result<Profile, ProfileError>;
    fn get_profile(&self, id: i64) -> Result<Profile, ProfileError>;
    fn list_profiles(&self) -> Result<Vec<Profile>, ProfileError>;
}

pub struct ProfileManager<'a> {
    conn: &'a Connection,
}

impl<'a> ProfileManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn row_to_profile(row: &rusqlite::Row) -> rusqlite::Result<Profile> {
        Ok(Profile {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: row.get(2)?,
        })
    }
}

impl<'a> ProfileManagerTrait for ProfileManager<'a> {
    fn create_profile(&mut self, name: &str) -> Result<Profile, ProfileError> {
        let name = name.trim();
        let created_at = chrono::Utc::now().timestamp_millis();

        match self.conn.execute(
            "INSERT INTO profiles (name, created_at) VALUES (?1, ?2)",
            params![name, created_at],
        ) {
            Ok(_) => Ok(Profile {
                id: self.conn.last_insert_rowid(),
                name: name.to_string(),
                created_at,
            }),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(ProfileError::AlreadyExists(name.to_string()))
            }
            Err(e) => Err(ProfileError::DatabaseError(e.to_string())),
        }
    }

    fn get_profile(&self, id: i64) -> Result<Profile, ProfileError> {
        self.conn
            .query_row(
                "SELECT id, name, created_at FROM profiles WHERE id = ?1",
                params![id],
                Self::row_to_profile,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => ProfileError::NotFound(id),
                other => ProfileError::DatabaseError(other.to_string()),
            })
    }

    fn list_profiles(&self) -> Result<Vec<Profile>, ProfileError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, created_at FROM profiles ORDER BY id")
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map([], Self::row_to_profile)
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ProfileError::DatabaseError(e.to_string()))
    }
}
