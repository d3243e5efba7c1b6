//! Video rows and their tag/speaker links.

use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{tags, write_error, CatalogStore};
use crate::domain::{
    CategoryId, Download, SpeakerId, TagId, Video, VideoId, VideoState,
};
use crate::error::{CatalogError, Result};

const VIDEO_COLUMNS: &str = "v.id, v.state, v.title, v.summary, v.description, v.category_id,
    v.quality_notes, v.copyright_text, v.embed, v.thumbnail_url,
    v.video_ogv_length, v.video_ogv_url, v.video_mp4_length, v.video_mp4_url,
    v.video_webm_length, v.video_webm_url, v.source_url, v.whiteboard,
    v.recorded, v.added, v.updated, v.slug";

/// Undated videos sort after dated ones
const VIDEO_ORDER: &str = "ORDER BY v.recorded IS NULL, v.recorded DESC, v.title ASC, v.id ASC";

/// Criteria for listing videos; every field left as `None` matches all
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoFilter {
    pub state: Option<VideoState>,
    pub category: Option<CategoryId>,
    pub speaker: Option<SpeakerId>,
    pub tag: Option<TagId>,
    pub limit: Option<usize>,
}

impl VideoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(mut self, state: VideoState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn category(mut self, category: CategoryId) -> Self {
        self.category = Some(category);
        self
    }

    pub fn speaker(mut self, speaker: SpeakerId) -> Self {
        self.speaker = Some(speaker);
        self
    }

    pub fn tag(mut self, tag: TagId) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

fn video_from_row(row: &Row<'_>) -> rusqlite::Result<Video> {
    Ok(Video {
        id: Some(row.get(0)?),
        state: row.get(1)?,
        title: row.get(2)?,
        summary: row.get(3)?,
        description: row.get(4)?,
        tags: Vec::new(),
        category: row.get(5)?,
        speakers: Vec::new(),
        quality_notes: row.get(6)?,
        copyright_text: row.get(7)?,
        embed: row.get(8)?,
        thumbnail_url: row.get(9)?,
        ogv: Download {
            length: row.get(10)?,
            url: row.get(11)?,
        },
        mp4: Download {
            length: row.get(12)?,
            url: row.get(13)?,
        },
        webm: Download {
            length: row.get(14)?,
            url: row.get(15)?,
        },
        source_url: row.get(16)?,
        whiteboard: row.get(17)?,
        recorded: row.get(18)?,
        added: row.get(19)?,
        updated: row.get(20)?,
        slug: row.get(21)?,
    })
}

fn load_links(conn: &Connection, video: &mut Video) -> Result<()> {
    let Some(id) = video.id else {
        return Ok(());
    };

    let mut stmt =
        conn.prepare_cached("SELECT tag_id FROM video_tags WHERE video_id = ?1 ORDER BY tag_id")?;
    video.tags = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut stmt = conn.prepare_cached(
        "SELECT speaker_id FROM video_speakers WHERE video_id = ?1 ORDER BY speaker_id",
    )?;
    video.speakers = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(())
}

fn replace_links(conn: &Connection, video: &Video, id: VideoId) -> Result<()> {
    conn.execute("DELETE FROM video_tags WHERE video_id = ?1", [id])?;
    conn.execute("DELETE FROM video_speakers WHERE video_id = ?1", [id])?;

    for tag in &video.tags {
        conn.execute(
            "INSERT OR IGNORE INTO video_tags (video_id, tag_id) VALUES (?1, ?2)",
            params![id, tag],
        )
        .map_err(|e| write_error(e, "video tag", &video.slug))?;
    }
    for speaker in &video.speakers {
        conn.execute(
            "INSERT OR IGNORE INTO video_speakers (video_id, speaker_id) VALUES (?1, ?2)",
            params![id, speaker],
        )
        .map_err(|e| write_error(e, "video speaker", &video.slug))?;
    }

    Ok(())
}

impl CatalogStore {
    /// Save a video.
    ///
    /// Recomputes the slug from the title and stamps timestamps (see
    /// [`Video::prepare_for_save`]), then writes the row and replaces the
    /// tag and speaker links in one transaction. `video` is only updated if
    /// the write succeeds; tag and speaker ids come back sorted and
    /// deduplicated, matching what a reload returns.
    pub fn save_video(&mut self, video: &mut Video) -> Result<VideoId> {
        self.save_video_tagged(video, &[] as &[&str])
    }

    /// Save a video, first linking it to the tags named by `labels`.
    ///
    /// Missing tags are created in the same transaction as the video row, so
    /// a failed save leaves no new tags behind.
    pub fn save_video_tagged<S: AsRef<str>>(
        &mut self,
        video: &mut Video,
        labels: &[S],
    ) -> Result<VideoId> {
        let mut prepared = video.clone();
        prepared.prepare_for_save(Utc::now())?;

        let tx = self.conn.transaction()?;

        for label in labels {
            prepared.tags.push(tags::get_or_create(&tx, label.as_ref())?);
        }
        prepared.tags.sort();
        prepared.tags.dedup();
        prepared.speakers.sort();
        prepared.speakers.dedup();

        let id = match prepared.id {
            None => {
                tx.execute(
                    "INSERT INTO videos
                        (state, title, summary, description, category_id, quality_notes,
                         copyright_text, embed, thumbnail_url,
                         video_ogv_length, video_ogv_url, video_mp4_length, video_mp4_url,
                         video_webm_length, video_webm_url, source_url, whiteboard,
                         recorded, added, updated, slug)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                             ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
                    params![
                        prepared.state,
                        prepared.title,
                        prepared.summary,
                        prepared.description,
                        prepared.category,
                        prepared.quality_notes,
                        prepared.copyright_text,
                        prepared.embed,
                        prepared.thumbnail_url,
                        prepared.ogv.length,
                        prepared.ogv.url,
                        prepared.mp4.length,
                        prepared.mp4.url,
                        prepared.webm.length,
                        prepared.webm.url,
                        prepared.source_url,
                        prepared.whiteboard,
                        prepared.recorded,
                        prepared.added,
                        prepared.updated,
                        prepared.slug,
                    ],
                )
                .map_err(|e| write_error(e, "video", &prepared.slug))?;
                VideoId(tx.last_insert_rowid())
            }
            Some(id) => {
                let changed = tx
                    .execute(
                        "UPDATE videos
                         SET state = ?1, title = ?2, summary = ?3, description = ?4,
                             category_id = ?5, quality_notes = ?6, copyright_text = ?7,
                             embed = ?8, thumbnail_url = ?9,
                             video_ogv_length = ?10, video_ogv_url = ?11,
                             video_mp4_length = ?12, video_mp4_url = ?13,
                             video_webm_length = ?14, video_webm_url = ?15,
                             source_url = ?16, whiteboard = ?17, recorded = ?18,
                             added = ?19, updated = ?20, slug = ?21
                         WHERE id = ?22",
                        params![
                            prepared.state,
                            prepared.title,
                            prepared.summary,
                            prepared.description,
                            prepared.category,
                            prepared.quality_notes,
                            prepared.copyright_text,
                            prepared.embed,
                            prepared.thumbnail_url,
                            prepared.ogv.length,
                            prepared.ogv.url,
                            prepared.mp4.length,
                            prepared.mp4.url,
                            prepared.webm.length,
                            prepared.webm.url,
                            prepared.source_url,
                            prepared.whiteboard,
                            prepared.recorded,
                            prepared.added,
                            prepared.updated,
                            prepared.slug,
                            id,
                        ],
                    )
                    .map_err(|e| write_error(e, "video", &prepared.slug))?;
                if changed == 0 {
                    return Err(CatalogError::NotFound {
                        entity: "video",
                        id: id.get(),
                    });
                }
                id
            }
        };

        replace_links(&tx, &prepared, id)?;
        tx.commit()?;

        prepared.id = Some(id);
        *video = prepared;
        debug!(id = %id, slug = %video.slug, "Saved video");
        Ok(id)
    }

    /// Get a video with its tag and speaker ids
    pub fn video(&self, id: VideoId) -> Result<Option<Video>> {
        let sql = format!("SELECT {} FROM videos v WHERE v.id = ?1", VIDEO_COLUMNS);
        self.fetch_one(&sql, Value::Integer(id.get()))
    }

    pub fn video_by_slug(&self, slug: &str) -> Result<Option<Video>> {
        let sql = format!("SELECT {} FROM videos v WHERE v.slug = ?1", VIDEO_COLUMNS);
        self.fetch_one(&sql, Value::Text(slug.to_string()))
    }

    /// Videos matching `filter`, most recently recorded first, then by title
    pub fn videos(&self, filter: &VideoFilter) -> Result<Vec<Video>> {
        let mut clauses: Vec<&str> = Vec::new();
        let mut args: Vec<Value> = Vec::new();

        if let Some(state) = filter.state {
            clauses.push("v.state = ?");
            args.push(Value::Integer(state.code()));
        }
        if let Some(category) = filter.category {
            clauses.push("v.category_id = ?");
            args.push(Value::Integer(category.get()));
        }
        if let Some(speaker) = filter.speaker {
            clauses.push(
                "EXISTS (SELECT 1 FROM video_speakers vs
                         WHERE vs.video_id = v.id AND vs.speaker_id = ?)",
            );
            args.push(Value::Integer(speaker.get()));
        }
        if let Some(tag) = filter.tag {
            clauses.push(
                "EXISTS (SELECT 1 FROM video_tags vt
                         WHERE vt.video_id = v.id AND vt.tag_id = ?)",
            );
            args.push(Value::Integer(tag.get()));
        }

        let mut sql = format!("SELECT {} FROM videos v", VIDEO_COLUMNS);
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push(' ');
        sql.push_str(VIDEO_ORDER);
        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            args.push(Value::Integer(limit as i64));
        }

        self.fetch_many(&sql, args)
    }

    /// The video with the most recent recorded date; undated videos never count
    pub fn latest_video(&self) -> Result<Option<Video>> {
        let sql = format!(
            "SELECT {} FROM videos v WHERE v.recorded IS NOT NULL {} LIMIT 1",
            VIDEO_COLUMNS, VIDEO_ORDER
        );
        Ok(self.fetch_many(&sql, Vec::new())?.into_iter().next())
    }

    /// Delete a video together with its related URLs and links
    pub fn delete_video(&mut self, id: VideoId) -> Result<()> {
        let deleted = self.conn.execute("DELETE FROM videos WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(CatalogError::NotFound {
                entity: "video",
                id: id.get(),
            });
        }

        info!(id = %id, "Deleted video");
        Ok(())
    }

    fn fetch_one(&self, sql: &str, key: Value) -> Result<Option<Video>> {
        let video = self.conn.query_row(sql, [key], video_from_row).optional()?;
        match video {
            Some(mut video) => {
                load_links(&self.conn, &mut video)?;
                Ok(Some(video))
            }
            None => Ok(None),
        }
    }

    fn fetch_many(&self, sql: &str, args: Vec<Value>) -> Result<Vec<Video>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut videos = stmt
            .query_map(params_from_iter(args), video_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        for video in &mut videos {
            load_links(&self.conn, video)?;
        }
        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{slugify, Category, CategoryKind, MediaFormat, Speaker};
    use chrono::NaiveDate;

    fn store_with_category() -> (CatalogStore, CategoryId) {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let id = store
            .save_category(&mut Category::new(
                CategoryKind::Conference,
                "PyCon",
                "PyCon 2012",
                "pycon-2012",
            ))
            .unwrap();
        (store, id)
    }

    #[test]
    fn test_save_video_derives_slug() {
        let (mut store, category) = store_with_category();
        let mut video = Video::new("Stop Writing Classes", category);
        video.slug = "something-else".to_string();

        let id = store.save_video(&mut video).unwrap();
        assert_eq!(video.slug, "stop-writing-classes");

        let loaded = store.video(id).unwrap().unwrap();
        assert_eq!(loaded.slug, slugify(&loaded.title));
        assert!(loaded.added.is_some());
        assert_eq!(loaded.added, video.added);
    }

    #[test]
    fn test_retitle_changes_slug() {
        let (mut store, category) = store_with_category();
        let mut video = Video::new("Draft title", category);
        let id = store.save_video(&mut video).unwrap();

        video.title = "Final Title".to_string();
        video.slug = "draft-title".to_string();
        store.save_video(&mut video).unwrap();

        assert!(store.video_by_slug("draft-title").unwrap().is_none());
        let loaded = store.video_by_slug("final-title").unwrap().unwrap();
        assert_eq!(loaded.id, Some(id));
    }

    #[test]
    fn test_links_roundtrip_sorted_and_deduplicated() {
        let (mut store, category) = store_with_category();
        let web = store.get_or_create_tag("web").unwrap();
        let api = store.get_or_create_tag("api").unwrap();
        let speaker = store
            .save_speaker(&mut Speaker::from_name("Jacob Kaplan-Moss"))
            .unwrap();

        let mut video = Video::new("Django in Depth", category)
            .with_tag(api)
            .with_tag(web)
            .with_tag(api)
            .with_speaker(speaker)
            .with_download(MediaFormat::Mp4, Download::new("http://x/d.mp4", Some(2048)));
        let id = store.save_video(&mut video).unwrap();

        let loaded = store.video(id).unwrap().unwrap();
        assert_eq!(loaded, video);
        assert_eq!(loaded.tags.len(), 2);
        assert_eq!(store.speakers_for_video(id).unwrap()[0].name, "Jacob Kaplan-Moss");
    }

    #[test]
    fn test_unknown_category_is_invalid_reference() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut video = Video::new("Orphan", CategoryId(404));

        let err = store.save_video(&mut video).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidReference(_)));
        assert!(video.id.is_none());
    }

    #[test]
    fn test_unknown_tag_rolls_back_video_row() {
        let (mut store, category) = store_with_category();
        let mut video = Video::new("Tagged", category).with_tag(TagId(99));

        assert!(store.save_video(&mut video).is_err());
        assert_eq!(store.counts().unwrap().videos, 0);
    }

    #[test]
    fn test_save_video_tagged_creates_and_reuses_tags() {
        let (mut store, category) = store_with_category();
        let web = store.get_or_create_tag("web").unwrap();

        let mut video = Video::new("Flask Internals", category);
        let id = store
            .save_video_tagged(&mut video, &["web", " wsgi "])
            .unwrap();

        let wsgi = store.tag_by_label("wsgi").unwrap().unwrap().id.unwrap();
        assert_eq!(video.tags, vec![web, wsgi]);
        assert_eq!(store.video(id).unwrap().unwrap().tags, vec![web, wsgi]);
        assert_eq!(store.counts().unwrap().tags, 2);
    }

    #[test]
    fn test_failed_tagged_save_leaves_no_tags() {
        let (mut store, category) = store_with_category();
        store
            .save_video(&mut Video::new("Lightning Talks", category))
            .unwrap();

        // Rejected before the transaction opens
        let mut unsluggable = Video::new("???", category);
        assert!(store
            .save_video_tagged(&mut unsluggable, &["brandnew"])
            .is_err());

        // Rejected by the unique slug column inside the transaction
        let mut duplicate = Video::new("Lightning talks!", category);
        let err = store
            .save_video_tagged(&mut duplicate, &["brandnew"])
            .unwrap_err();
        assert!(matches!(err, CatalogError::SlugConflict { .. }));

        let counts = store.counts().unwrap();
        assert_eq!(counts.videos, 1);
        assert_eq!(counts.tags, 0);
        assert!(duplicate.tags.is_empty());
    }

    #[test]
    fn test_latest_ignores_undated() {
        let (mut store, category) = store_with_category();
        assert!(store.latest_video().unwrap().is_none());

        store
            .save_video(&mut Video::new("Undated", category))
            .unwrap();
        assert!(store.latest_video().unwrap().is_none());

        store
            .save_video(
                &mut Video::new("Older", category)
                    .with_recorded(NaiveDate::from_ymd_opt(2011, 3, 11).unwrap()),
            )
            .unwrap();
        store
            .save_video(
                &mut Video::new("Newer", category)
                    .with_recorded(NaiveDate::from_ymd_opt(2012, 3, 9).unwrap()),
            )
            .unwrap();

        assert_eq!(store.latest_video().unwrap().unwrap().title, "Newer");
    }

    #[test]
    fn test_filter_by_state_and_limit() {
        let (mut store, category) = store_with_category();
        for (title, state) in [
            ("Alpha", VideoState::Live),
            ("Beta", VideoState::Draft),
            ("Gamma", VideoState::Live),
        ] {
            store
                .save_video(&mut Video::new(title, category).with_state(state))
                .unwrap();
        }

        let live = store
            .videos(&VideoFilter::new().state(VideoState::Live))
            .unwrap();
        let titles: Vec<_> = live.iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "Gamma"]);

        let first = store.videos(&VideoFilter::new().limit(1)).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].title, "Alpha");
    }
}
