//! Speaker rows.

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::{write_error, CatalogStore};
use crate::domain::{Speaker, SpeakerId, VideoId};
use crate::error::{CatalogError, Result};

fn speaker_from_row(row: &Row<'_>) -> rusqlite::Result<Speaker> {
    Ok(Speaker {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        slug: row.get(2)?,
    })
}

impl CatalogStore {
    /// Insert a new speaker or update an existing one; sets `speaker.id`
    pub fn save_speaker(&mut self, speaker: &mut Speaker) -> Result<SpeakerId> {
        speaker.validate()?;

        let id = match speaker.id {
            None => {
                self.conn
                    .execute(
                        "INSERT INTO speakers (name, slug) VALUES (?1, ?2)",
                        params![speaker.name, speaker.slug],
                    )
                    .map_err(|e| write_error(e, "speaker", &speaker.slug))?;
                SpeakerId(self.conn.last_insert_rowid())
            }
            Some(id) => {
                let changed = self
                    .conn
                    .execute(
                        "UPDATE speakers SET name = ?1, slug = ?2 WHERE id = ?3",
                        params![speaker.name, speaker.slug, id],
                    )
                    .map_err(|e| write_error(e, "speaker", &speaker.slug))?;
                if changed == 0 {
                    return Err(CatalogError::NotFound {
                        entity: "speaker",
                        id: id.get(),
                    });
                }
                id
            }
        };

        speaker.id = Some(id);
        debug!(id = %id, slug = %speaker.slug, "Saved speaker");
        Ok(id)
    }

    pub fn speaker(&self, id: SpeakerId) -> Result<Option<Speaker>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, slug FROM speakers WHERE id = ?1",
                [id],
                speaker_from_row,
            )
            .optional()?)
    }

    pub fn speaker_by_slug(&self, slug: &str) -> Result<Option<Speaker>> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, name, slug FROM speakers WHERE slug = ?1",
                [slug],
                speaker_from_row,
            )
            .optional()?)
    }

    /// All speakers ordered by name
    pub fn speakers(&self) -> Result<Vec<Speaker>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, slug FROM speakers ORDER BY name ASC, id ASC")?;
        let rows = stmt.query_map([], speaker_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Speakers linked to a video, ordered by name
    pub fn speakers_for_video(&self, video: VideoId) -> Result<Vec<Speaker>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.name, s.slug
             FROM speakers s
             JOIN video_speakers vs ON vs.speaker_id = s.id
             WHERE vs.video_id = ?1
             ORDER BY s.name ASC, s.id ASC",
        )?;
        let rows = stmt.query_map([video], speaker_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Delete a speaker; videos keep existing, only their links go away
    pub fn delete_speaker(&mut self, id: SpeakerId) -> Result<()> {
        let deleted = self.conn.execute("DELETE FROM speakers WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(CatalogError::NotFound {
                entity: "speaker",
                id: id.get(),
            });
        }

        info!(id = %id, "Deleted speaker");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speakers_ordered_by_name() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        for name in ["Raymond Hettinger", "Alex Gaynor", "Jessica McKellar"] {
            store.save_speaker(&mut Speaker::from_name(name)).unwrap();
        }

        let names: Vec<_> = store
            .speakers()
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["Alex Gaynor", "Jessica McKellar", "Raymond Hettinger"]);
    }

    #[test]
    fn test_speaker_slug_unique() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.save_speaker(&mut Speaker::new("Alex", "alex")).unwrap();

        let err = store
            .save_speaker(&mut Speaker::new("Alex Two", "alex"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::SlugConflict { entity: "speaker", .. }));
    }

    #[test]
    fn test_speaker_lookup_by_slug() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let id = store
            .save_speaker(&mut Speaker::from_name("David Beazley"))
            .unwrap();

        let speaker = store.speaker_by_slug("david-beazley").unwrap().unwrap();
        assert_eq!(speaker.id, Some(id));
        assert!(store.speaker_by_slug("nobody").unwrap().is_none());
    }
}
