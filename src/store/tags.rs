//! Tag rows.

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{write_error, CatalogStore};
use crate::domain::{Tag, TagId, VideoId};
use crate::error::{CatalogError, Result};

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: Some(row.get(0)?),
        tag: row.get(1)?,
    })
}

fn find_by_label(conn: &Connection, label: &str) -> Result<Option<Tag>> {
    Ok(conn
        .query_row(
            "SELECT id, tag FROM tags WHERE tag = ?1 ORDER BY id ASC LIMIT 1",
            [label.trim()],
            tag_from_row,
        )
        .optional()?)
}

fn insert_tag(conn: &Connection, label: &str) -> Result<TagId> {
    conn.execute("INSERT INTO tags (tag) VALUES (?1)", [label])
        .map_err(|e| write_error(e, "tag", label))?;
    Ok(TagId(conn.last_insert_rowid()))
}

/// Get-or-create on any connection, so callers can run it inside their
/// own transaction. Labels are stored trimmed.
pub(crate) fn get_or_create(conn: &Connection, label: &str) -> Result<TagId> {
    let tag = Tag::new(label.trim());
    tag.validate()?;

    if let Some(id) = find_by_label(conn, &tag.tag)?.and_then(|existing| existing.id) {
        return Ok(id);
    }
    let id = insert_tag(conn, &tag.tag)?;
    debug!(id = %id, tag = %tag.tag, "Created tag");
    Ok(id)
}

impl CatalogStore {
    /// Insert a new tag or relabel an existing one; sets `tag.id`.
    ///
    /// The label is stored trimmed, the same form lookups use.
    pub fn save_tag(&mut self, tag: &mut Tag) -> Result<TagId> {
        let label = tag.tag.trim().to_string();
        Tag::new(label.as_str()).validate()?;

        let id = match tag.id {
            None => insert_tag(&self.conn, &label)?,
            Some(id) => {
                let changed = self
                    .conn
                    .execute(
                        "UPDATE tags SET tag = ?1 WHERE id = ?2",
                        params![label, id],
                    )
                    .map_err(|e| write_error(e, "tag", &label))?;
                if changed == 0 {
                    return Err(CatalogError::NotFound {
                        entity: "tag",
                        id: id.get(),
                    });
                }
                id
            }
        };

        tag.id = Some(id);
        tag.tag = label;
        debug!(id = %id, tag = %tag.tag, "Saved tag");
        Ok(id)
    }

    pub fn tag(&self, id: TagId) -> Result<Option<Tag>> {
        Ok(self
            .conn
            .query_row("SELECT id, tag FROM tags WHERE id = ?1", [id], tag_from_row)
            .optional()?)
    }

    /// First tag (lowest id) with this label, ignoring surrounding whitespace
    pub fn tag_by_label(&self, label: &str) -> Result<Option<Tag>> {
        find_by_label(&self.conn, label)
    }

    /// Look up a tag by label, creating it if missing
    pub fn get_or_create_tag(&mut self, label: &str) -> Result<TagId> {
        get_or_create(&self.conn, label)
    }

    /// All tags ordered by label
    pub fn tags(&self) -> Result<Vec<Tag>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, tag FROM tags ORDER BY tag ASC, id ASC")?;
        let rows = stmt.query_map([], tag_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Tags linked to a video, ordered by label
    pub fn tags_for_video(&self, video: VideoId) -> Result<Vec<Tag>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.id, t.tag
             FROM tags t
             JOIN video_tags vt ON vt.tag_id = t.id
             WHERE vt.video_id = ?1
             ORDER BY t.tag ASC, t.id ASC",
        )?;
        let rows = stmt.query_map([video], tag_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Delete a tag; videos keep existing, only their links go away
    pub fn delete_tag(&mut self, id: TagId) -> Result<()> {
        let deleted = self.conn.execute("DELETE FROM tags WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(CatalogError::NotFound {
                entity: "tag",
                id: id.get(),
            });
        }

        info!(id = %id, "Deleted tag");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_create_tag() {
        let mut store = CatalogStore::open_in_memory().unwrap();

        let first = store.get_or_create_tag("web").unwrap();
        let second = store.get_or_create_tag(" web ").unwrap();
        assert_eq!(first, second);
        assert_eq!(store.tags().unwrap().len(), 1);
    }

    #[test]
    fn test_tags_ordered_by_label() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        for label in ["testing", "django", "async"] {
            store.get_or_create_tag(label).unwrap();
        }

        let labels: Vec<_> = store.tags().unwrap().into_iter().map(|t| t.tag).collect();
        assert_eq!(labels, vec!["async", "django", "testing"]);
    }

    #[test]
    fn test_tag_too_long_rejected() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let err = store
            .save_tag(&mut Tag::new("x".repeat(31)))
            .unwrap_err();
        assert!(matches!(err, CatalogError::Invalid { entity: "tag", .. }));
    }

    #[test]
    fn test_saved_label_is_trimmed() {
        let mut store = CatalogStore::open_in_memory().unwrap();

        let mut tag = Tag::new(" web ");
        let saved = store.save_tag(&mut tag).unwrap();
        assert_eq!(tag.tag, "web");

        assert_eq!(store.get_or_create_tag("web").unwrap(), saved);
        assert_eq!(store.tag_by_label("web ").unwrap().unwrap().id, Some(saved));
        assert_eq!(store.tags().unwrap().len(), 1);
    }

    #[test]
    fn test_relabel_is_trimmed() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let id = store.get_or_create_tag("web").unwrap();

        let mut tag = store.tag(id).unwrap().unwrap();
        tag.tag = "  http  ".to_string();
        store.save_tag(&mut tag).unwrap();

        assert_eq!(store.tag(id).unwrap().unwrap().tag, "http");
    }

    #[test]
    fn test_delete_tag() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let id = store.get_or_create_tag("web").unwrap();

        store.delete_tag(id).unwrap();
        assert!(store.tag(id).unwrap().is_none());
        assert!(matches!(
            store.delete_tag(id),
            Err(CatalogError::NotFound { entity: "tag", .. })
        ));
    }

    #[test]
    fn test_empty_tag_rejected() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        assert!(store.get_or_create_tag("   ").is_err());
    }
}
