//! Tag Manager.
//!
//! Tags are global (shared by every profile) and keyed by their exact,
//! trimmed name: `Work` and `work` are two different tags.

use rusqlite::{params, Connection, OptionalExtension};

use crate::types::errors::TagError;
use crate::types::tag::{Tag, TagUsage};

/// Trait defining tag operations.
pub trait TagManagerTrait {
    fn find_by_name(&self, name: &str) -> Result<Option<Tag>, TagError>;
    /// Returns the existing tag with this name, creating it first if absent.
    fn find_or_create(&mut self, name: &str) -> Result<Tag, TagError>;
    /// Links a tag to a deeplink. Attaching twice is a no-op.
    fn attach(&mut self, link_id: i64, tag_id: i64) -> Result<(), TagError>;
    fn tags_for_link(&self, link_id: i64) -> Result<Vec<String>, TagError>;
    fn list_tags(&self) -> Result<Vec<Tag>, TagError>;
    fn list_tags_with_usage(&self) -> Result<Vec<TagUsage>, TagError>;
    /// Deletes those of `tag_ids` that no longer have any link. Returns how many went.
    fn delete_orphans(&mut self, tag_ids: &[i64]) -> Result<usize, TagError>;
}

/// Splits a comma-separated tag field into trimmed, non-empty, de-duplicated names.
pub fn split_tag_list(raw: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let name = part.trim();
        if !name.is_empty() && !tags.iter().any(|t| t == name) {
            tags.push(name.to_string());
        }
    }
    tags
}

/// Tag manager backed by a SQLite connection.
pub struct TagManager<'a> {
    conn: &'a Connection,
}

impl<'a> TagManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn db_err(e: rusqlite::Error) -> TagError {
        TagError::DatabaseError(e.to_string())
    }
}

impl<'a> TagManagerTrait for TagManager<'a> {
    fn find_by_name(&self, name: &str) -> Result<Option<Tag>, TagError> {
        self.conn
            .query_row(
                "SELECT id, name FROM tags WHERE name = ?1",
                params![name.trim()],
                |row| {
                    Ok(Tag {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()
            .map_err(Self::db_err)
    }

    fn find_or_create(&mut self, name: &str) -> Result<Tag, TagError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TagError::EmptyName);
        }
        if let Some(tag) = self.find_by_name(name)? {
            return Ok(tag);
        }

        self.conn
            .execute("INSERT INTO tags (name) VALUES (?1)", params![name])
            .map_err(Self::db_err)?;

        Ok(Tag {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    fn attach(&mut self, link_id: i64, tag_id: i64) -> Result<(), TagError> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO deeplink_tags (deeplink_id, tag_id) VALUES (?1, ?2)",
                params![link_id, tag_id],
            )
            .map_err(Self::db_err)?;
        Ok(())
    }

    fn tags_for_link(&self, link_id: i64) -> Result<Vec<String>, TagError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT t.name FROM tags t \
                 JOIN deeplink_tags dt ON dt.tag_id = t.id \
                 WHERE dt.deeplink_id = ?1 ORDER BY t.name",
            )
            .map_err(Self::db_err)?;

        let rows = stmt
            .query_map(params![link_id], |row| row.get::<_, String>(0))
            .map_err(Self::db_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Self::db_err)
    }

    fn list_tags(&self) -> Result<Vec<Tag>, TagError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM tags ORDER BY name")
            .map_err(Self::db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(Tag {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            })
            .map_err(Self::db_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Self::db_err)
    }

    fn list_tags_with_usage(&self) -> Result<Vec<TagUsage>, TagError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT t.id, t.name, COUNT(dt.deeplink_id) FROM tags t \
                 LEFT JOIN deeplink_tags dt ON dt.tag_id = t.id \
                 GROUP BY t.id, t.name ORDER BY t.name",
            )
            .map_err(Self::db_err)?;

        let rows = stmt
            .query_map([], |row| {
                Ok(TagUsage {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    count: row.get(2)?,
                })
            })
            .map_err(Self::db_err)?;

        rows.collect::<Result<Vec<_>, _>>().map_err(Self::db_err)
    }

    fn delete_orphans(&mut self, tag_ids: &[i64]) -> Result<usize, TagError> {
        let mut deleted = 0;
        for tag_id in tag_ids {
            deleted += self
                .conn
                .execute(
                    "DELETE FROM tags WHERE id = ?1 \
                     AND NOT EXISTS (SELECT 1 FROM deeplink_tags WHERE tag_id = ?1)",
                    params![tag_id],
                )
                .map_err(Self::db_err)?;
        }
        Ok(deleted)
    }
}
