//! Related URL rows, owned by videos.

use rusqlite::{params, Row};
use tracing::debug;

use super::{write_error, CatalogStore};
use crate::domain::{RelatedUrl, RelatedUrlId, VideoId};
use crate::error::{CatalogError, Result};

fn related_url_from_row(row: &Row<'_>) -> rusqlite::Result<RelatedUrl> {
    Ok(RelatedUrl {
        id: Some(row.get(0)?),
        video: row.get(1)?,
        url: row.get(2)?,
        description: row.get(3)?,
    })
}

impl CatalogStore {
    /// Insert a new related URL or update an existing one; sets `related.id`
    pub fn save_related_url(&mut self, related: &mut RelatedUrl) -> Result<RelatedUrlId> {
        related.validate()?;

        let id = match related.id {
            None => {
                self.conn
                    .execute(
                        "INSERT INTO related_urls (video_id, url, description) VALUES (?1, ?2, ?3)",
                        params![related.video, related.url, related.description],
                    )
                    .map_err(|e| write_error(e, "related url", &related.url))?;
                RelatedUrlId(self.conn.last_insert_rowid())
            }
            Some(id) => {
                let changed = self
                    .conn
                    .execute(
                        "UPDATE related_urls SET video_id = ?1, url = ?2, description = ?3
                         WHERE id = ?4",
                        params![related.video, related.url, related.description, id],
                    )
                    .map_err(|e| write_error(e, "related url", &related.url))?;
                if changed == 0 {
                    return Err(CatalogError::NotFound {
                        entity: "related url",
                        id: id.get(),
                    });
                }
                id
            }
        };

        related.id = Some(id);
        debug!(id = %id, video = %related.video, "Saved related url");
        Ok(id)
    }

    /// Attach a URL to a video
    pub fn add_related_url(&mut self, related: &mut RelatedUrl) -> Result<RelatedUrlId> {
        related.id = None;
        self.save_related_url(related)
    }

    /// Related URLs of a video, in the order they were added
    pub fn related_urls(&self, video: VideoId) -> Result<Vec<RelatedUrl>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, video_id, url, description FROM related_urls
             WHERE video_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([video], related_url_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn delete_related_url(&mut self, id: RelatedUrlId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM related_urls WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(CatalogError::NotFound {
                entity: "related url",
                id: id.get(),
            });
        }
        Ok(())
    }
}
