//! JSON snapshot of the whole catalog.
//!
//! Videos are written with their related URLs inlined; categories, speakers
//! and tags are referenced by id.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use crate::domain::{Category, RelatedUrl, Speaker, Tag, Video};
use crate::error::Result;
use crate::store::{CatalogStore, VideoFilter};

/// Export format version
pub const EXPORT_VERSION: u32 = 1;

/// A point-in-time copy of every catalog row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogExport {
    /// Export format version
    pub version: u32,

    /// When the snapshot was taken
    pub exported_at: DateTime<Utc>,

    pub categories: Vec<Category>,
    pub speakers: Vec<Speaker>,
    pub tags: Vec<Tag>,
    pub videos: Vec<ExportedVideo>,
}

/// A video together with the URLs it owns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedVideo {
    #[serde(flatten)]
    pub video: Video,

    #[serde(default)]
    pub related_urls: Vec<RelatedUrl>,
}

impl CatalogExport {
    /// Snapshot the store, each list in catalog order
    pub fn collect(store: &CatalogStore) -> Result<Self> {
        let mut videos = Vec::new();
        for video in store.videos(&VideoFilter::new())? {
            let related_urls = match video.id {
                Some(id) => store.related_urls(id)?,
                None => Vec::new(),
            };
            videos.push(ExportedVideo {
                video,
                related_urls,
            });
        }

        Ok(Self {
            version: EXPORT_VERSION,
            exported_at: Utc::now(),
            categories: store.categories()?,
            speakers: store.speakers()?,
            tags: store.tags()?,
            videos,
        })
    }

    /// Write the snapshot as pretty JSON, creating parent directories
    pub async fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;

        info!(
            path = %path.display(),
            videos = self.videos.len(),
            "Catalog exported"
        );
        Ok(())
    }

    /// Read a snapshot written by [`CatalogExport::write_to`]
    pub async fn read_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&content)?)
    }
}
