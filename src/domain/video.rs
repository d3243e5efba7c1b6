//! Videos: recorded talks and their metadata.
//!
//! A video's slug is never set by hand. [`Video::prepare_for_save`] derives it
//! from the title, and the store calls it on every write, so after any save
//! `video.slug == slugify(&video.title)` holds.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{
    check_len, slugify, CategoryId, Permalink, SpeakerId, TagId, VideoId, MAX_TEXT_LEN,
};
use crate::error::{CatalogError, Result};

/// Publication state of a video
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoState {
    /// Visible on the site
    Live,

    /// Still being edited
    Draft,
}

impl VideoState {
    /// Integer code stored in the database
    pub fn code(self) -> i64 {
        match self {
            VideoState::Live => 1,
            VideoState::Draft => 2,
        }
    }

    /// Parse a stored integer code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(VideoState::Live),
            2 => Some(VideoState::Draft),
            _ => None,
        }
    }
}

impl fmt::Display for VideoState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VideoState::Live => write!(f, "live"),
            VideoState::Draft => write!(f, "draft"),
        }
    }
}

/// Downloadable encodings a video may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFormat {
    Ogv,
    Mp4,
    Webm,
}

impl MediaFormat {
    pub const ALL: [MediaFormat; 3] = [MediaFormat::Ogv, MediaFormat::Mp4, MediaFormat::Webm];

    pub fn extension(self) -> &'static str {
        match self {
            MediaFormat::Ogv => "ogv",
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Webm => "webm",
        }
    }
}

/// One downloadable encoding: byte length and URL, each optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    /// Size in bytes
    pub length: Option<i64>,
    pub url: Option<String>,
}

impl Download {
    pub fn new(url: impl Into<String>, length: Option<i64>) -> Self {
        Self {
            length,
            url: Some(url.into()),
        }
    }

    /// True when neither length nor URL is set
    pub fn is_empty(&self) -> bool {
        self.length.is_none() && self.url.is_none()
    }
}

/// A recorded talk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Video {
    /// Row id (None until saved)
    pub id: Option<VideoId>,

    /// Publication state (None for imported, unreviewed videos)
    pub state: Option<VideoState>,

    pub title: String,

    /// HTML summary
    #[serde(default)]
    pub summary: String,

    /// HTML description
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub tags: Vec<TagId>,

    /// Owning category
    pub category: CategoryId,

    #[serde(default)]
    pub speakers: Vec<SpeakerId>,

    /// Notes on audio/video quality issues (HTML)
    #[serde(default)]
    pub quality_notes: String,

    /// Copyright/license text; when absent, the source link applies
    pub copyright_text: Option<String>,

    /// Embeddable player markup
    pub embed: Option<String>,

    pub thumbnail_url: Option<String>,

    #[serde(default)]
    pub ogv: Download,

    #[serde(default)]
    pub mp4: Download,

    #[serde(default)]
    pub webm: Download,

    /// Where the video was found, in case it has to be fetched again
    pub source_url: Option<String>,

    /// Editor notes
    #[serde(default)]
    pub whiteboard: String,

    /// When the talk was recorded
    pub recorded: Option<NaiveDate>,

    /// When the video was first saved
    pub added: Option<DateTime<Utc>>,

    /// When the video was last saved
    pub updated: Option<DateTime<Utc>>,

    /// Derived from the title on every save
    pub slug: String,
}

impl Video {
    /// Create an unsaved video in the given category
    pub fn new(title: impl Into<String>, category: CategoryId) -> Self {
        let title = title.into();
        let slug = slugify(&title);
        Self {
            id: None,
            state: None,
            title,
            summary: String::new(),
            description: String::new(),
            tags: Vec::new(),
            category,
            speakers: Vec::new(),
            quality_notes: String::new(),
            copyright_text: None,
            embed: None,
            thumbnail_url: None,
            ogv: Download::default(),
            mp4: Download::default(),
            webm: Download::default(),
            source_url: None,
            whiteboard: String::new(),
            recorded: None,
            added: None,
            updated: None,
            slug,
        }
    }

    pub fn with_state(mut self, state: VideoState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_recorded(mut self, recorded: NaiveDate) -> Self {
        self.recorded = Some(recorded);
        self
    }

    pub fn with_speaker(mut self, speaker: SpeakerId) -> Self {
        self.speakers.push(speaker);
        self
    }

    pub fn with_tag(mut self, tag: TagId) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_download(mut self, format: MediaFormat, download: Download) -> Self {
        *self.download_mut(format) = download;
        self
    }

    /// Get the download slot for a format
    pub fn download(&self, format: MediaFormat) -> &Download {
        match format {
            MediaFormat::Ogv => &self.ogv,
            MediaFormat::Mp4 => &self.mp4,
            MediaFormat::Webm => &self.webm,
        }
    }

    pub fn download_mut(&mut self, format: MediaFormat) -> &mut Download {
        match format {
            MediaFormat::Ogv => &mut self.ogv,
            MediaFormat::Mp4 => &mut self.mp4,
            MediaFormat::Webm => &mut self.webm,
        }
    }

    /// Formats that have a URL or length set
    pub fn available_downloads(&self) -> impl Iterator<Item = (MediaFormat, &Download)> {
        MediaFormat::ALL
            .into_iter()
            .map(move |format| (format, self.download(format)))
            .filter(|(_, download)| !download.is_empty())
    }

    /// Bring derived fields up to date before a write.
    ///
    /// Overwrites `slug` with `slugify(title)` unconditionally, stamps
    /// `updated`, and sets `added` on the first save. An invalid record is
    /// left untouched.
    pub fn prepare_for_save(&mut self, now: DateTime<Utc>) -> Result<()> {
        let slug = slugify(&self.title);
        if slug.is_empty() {
            return Err(CatalogError::invalid(
                "video",
                format!("title {:?} produces an empty slug", self.title),
            ));
        }
        self.validate()?;

        self.slug = slug;
        self.added.get_or_insert(now);
        self.updated = Some(now);
        Ok(())
    }

    /// Check field limits
    pub fn validate(&self) -> Result<()> {
        check_len("video", "title", &self.title, MAX_TEXT_LEN)?;
        check_len("video", "whiteboard", &self.whiteboard, MAX_TEXT_LEN)?;
        for (field, value) in [
            ("thumbnail_url", &self.thumbnail_url),
            ("source_url", &self.source_url),
            ("ogv url", &self.ogv.url),
            ("mp4 url", &self.mp4.url),
            ("webm url", &self.webm.url),
        ] {
            if let Some(value) = value {
                check_len("video", field, value, MAX_TEXT_LEN)?;
            }
        }
        for format in MediaFormat::ALL {
            if matches!(self.download(format).length, Some(len) if len < 0) {
                return Err(CatalogError::invalid(
                    "video",
                    format!("{} length is negative", format.extension()),
                ));
            }
        }
        Ok(())
    }

    /// Catalog ordering: most recently recorded first, undated last, then title
    pub fn catalog_order(a: &Self, b: &Self) -> Ordering {
        let by_recorded = match (a.recorded, b.recorded) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_recorded.then_with(|| a.title.cmp(&b.title))
    }

    pub fn is_live(&self) -> bool {
        self.state == Some(VideoState::Live)
    }
}

impl Permalink for Video {
    const ROUTE: &'static str = "video";

    fn permalink_id(&self) -> Option<i64> {
        self.id.map(VideoId::get)
    }

    fn permalink_slug(&self) -> &str {
        &self.slug
    }
}

impl fmt::Display for Video {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.title.chars().take(30).collect();
        write!(f, "{} (category {})", short, self.category)
    }
}
