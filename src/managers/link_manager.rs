//! Link Manager.
//!
//! Implements `LinkManagerTrait` over the `deeplinks` table. Links are scoped
//! to a profile and unique by exact `link` text within it.

use std::collections::HashMap;

use rusqlite::{params, Connection, ErrorCode};

use crate::managers::tag_manager::{TagManager, TagManagerTrait};
use crate::types::deeplink::{LinkWithTags, NewDeeplink, StoredLink};
use crate::types::errors::LinkError;

const LINK_COLUMNS: &str = "id, link, name, notes, thumbnail, opened_count, is_favourite, \
                            created_at, last_opened_at, profile_id";

/// Trait defining stored-link operations.
pub trait LinkManagerTrait {
    fn link_exists(&self, profile_id: i64, link: &str) -> Result<bool, LinkError>;
    /// Inserts one row and returns its id. Tags on `new` are not touched here.
    fn insert_link(&mut self, profile_id: i64, new: &NewDeeplink) -> Result<i64, LinkError>;
    fn get_link(&self, id: i64) -> Result<StoredLink, LinkError>;
    fn list_links(&self, profile_id: i64) -> Result<Vec<StoredLink>, LinkError>;
    fn list_links_with_tags(&self, profile_id: i64) -> Result<Vec<LinkWithTags>, LinkError>;
    fn count_links(&self, profile_id: i64) -> Result<i64, LinkError>;
    /// Deletes a link and any of its tags left without links.
    fn delete_link(&mut self, id: i64) -> Result<(), LinkError>;
    fn record_open(&mut self, id: i64) -> Result<(), LinkError>;
    fn set_favourite(&mut self, id: i64, favourite: bool) -> Result<(), LinkError>;
}

/// Link manager backed by a SQLite connection.
pub struct LinkManager<'a> {
    conn: &'a Connection,
}

impl<'a> LinkManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    fn db_err(e: rusqlite::Error) -> LinkError {
        LinkError::DatabaseError(e.to_string())
    }

    fn row_to_link(row: &rusqlite::Row) -> rusqlite::Result<StoredLink> {
        Ok(StoredLink {
            id: row.get(0)?,
            link: row.get(1)?,
            name: row.get(2)?,
            notes: row.get(3)?,
            thumbnail: row.get(4)?,
            opened_count: row.get(5)?,
            is_favourite: row.get(6)?,
            created_at: row.get(7)?,
            last_opened_at: row.get(8)?,
            profile_id: row.get(9)?,
        })
    }

    fn tags_by_link(&self, profile_id: i64) -> Result<HashMap<i64, Vec<String>>, LinkError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT dt.deeplink_id, t.name FROM deeplink_tags dt \
                 JOIN tags t ON t.id = dt.tag_id \
                 JOIN deeplinks d ON d.id = dt.deeplink_id \
                 WHERE d.profile_id = ?1 ORDER BY t.name",
            )
            .map_err(Self::db_err)?;

        let rows = stmt
            .query_map(params![profile_id], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(Self::db_err)?;

        let mut by_link: HashMap<i64, Vec<String>> = HashMap::new();
        for row in rows {
            let (link_id, name) = row.map_err(Self::db_err)?;
            by_link.entry(link_id).or_default().push(name);
        }
        Ok(by_link)
    }

    fn ensure_updated(affected: usize, id: i64) -> Result<(), LinkError> {
        if affected == 0 {
            return Err(LinkError::NotFound(id));
        }
        Ok(())
    }
}

impl<'a> LinkManagerTrait for LinkManager<'a> {
    fn link_exists(&self, profile_id: i64, link: &str) -> Result<bool, LinkError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM deeplinks WHERE profile_id = ?1 AND link = ?2",
                params![profile_id, link],
                |row| row.get(0),
            )
            .map_err(Self::db_err)?;
        Ok(count > 0)
    }

    fn insert_link(&mut self, profile_id: i64, new: &NewDeeplink) -> Result<i64, LinkError> {
        let created_at = new.created_at.unwrap_or_else(Self::now);

        let result = self.conn.execute(
            "INSERT INTO deeplinks (link, name, notes, thumbnail, opened_count, is_favourite, created_at, profile_id) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                new.link,
                new.name,
                new.notes,
                new.thumbnail,
                new.opened_count.max(0),
                new.is_favourite,
                created_at,
                profile_id
            ],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
                    && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                Err(LinkError::Duplicate(new.link.clone()))
            }
            Err(e) => Err(Self::db_err(e)),
        }
    }

    fn get_link(&self, id: i64) -> Result<StoredLink, LinkError> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM deeplinks WHERE id = ?1", LINK_COLUMNS),
                params![id],
                Self::row_to_link,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => LinkError::NotFound(id),
                other => Self::db_err(other),
            })
    }

    fn list_links(&self, profile_id: i64) -> Result<Vec<StoredLink>, LinkError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM deeplinks WHERE profile_id = ?1 ORDER BY created_at DESC, id DESC",
                LINK_COLUMNS
            ))
            .map_err(Self::db_err)?;

        let rows = stmt
            .query_map(params![profile_id], Self::row_to_link)
            .map_err(Self::db_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Self::db_err)
    }

    fn list_links_with_tags(&self, profile_id: i64) -> Result<Vec<LinkWithTags>, LinkError> {
        let links = self.list_links(profile_id)?;
        let mut tags = self.tags_by_link(profile_id)?;

        Ok(links
            .into_iter()
            .map(|link| LinkWithTags {
                tags: tags.remove(&link.id).unwrap_or_default(),
                link,
            })
            .collect())
    }

    fn count_links(&self, profile_id: i64) -> Result<i64, LinkError> {
        self.conn
            .query_row(
                "SELECT COUNT(*) FROM deeplinks WHERE profile_id = ?1",
                params![profile_id],
                |row| row.get(0),
            )
            .map_err(Self::db_err)
    }

    fn delete_link(&mut self, id: i64) -> Result<(), LinkError> {
        let tx = self.conn.unchecked_transaction().map_err(Self::db_err)?;

        let tag_ids: Vec<i64> = {
            let mut stmt = tx
                .prepare("SELECT tag_id FROM deeplink_tags WHERE deeplink_id = ?1")
                .map_err(Self::db_err)?;
            let rows = stmt
                .query_map(params![id], |row| row.get(0))
                .map_err(Self::db_err)?;
            rows.collect::<Result<Vec<_>, _>>().map_err(Self::db_err)?
        };

        tx.execute("DELETE FROM deeplink_tags WHERE deeplink_id = ?1", params![id])
            .map_err(Self::db_err)?;
        let affected = tx
            .execute("DELETE FROM deeplinks WHERE id = ?1", params![id])
            .map_err(Self::db_err)?;
        Self::ensure_updated(affected, id)?;

        TagManager::new(&tx)
            .delete_orphans(&tag_ids)
            .map_err(|e| LinkError::DatabaseError(e.to_string()))?;

        tx.commit().map_err(Self::db_err)
    }

    fn record_open(&mut self, id: i64) -> Result<(), LinkError> {
        let affected = self
            .conn
            .execute(
                "UPDATE deeplinks SET opened_count = opened_count + 1, last_opened_at = ?1 WHERE id = ?2",
                params![Self::now(), id],
            )
            .map_err(Self::db_err)?;
        Self::ensure_updated(affected, id)
    }

    fn set_favourite(&mut self, id: i64, favourite: bool) -> Result<(), LinkError> {
        let affected = self
            .conn
            .execute(
                "UPDATE deeplinks SET is_favourite = ?1 WHERE id = ?2",
                params![favourite, id],
            )
            .map_err(Self::db_err)?;
        Self::ensure_updated(affected, id)
    }
}
