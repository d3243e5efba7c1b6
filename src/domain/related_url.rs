//! Extra links attached to a video (slides, project pages, ...).

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{check_len, RelatedUrlId, VideoId, MAX_TEXT_LEN};
use crate::error::{CatalogError, Result};

/// A URL owned by exactly one video; deleted along with it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedUrl {
    pub id: Option<RelatedUrlId>,

    /// Owning video
    pub video: VideoId,

    pub url: String,

    #[serde(default)]
    pub description: String,
}

impl RelatedUrl {
    pub fn new(video: VideoId, url: impl Into<String>) -> Self {
        Self {
            id: None,
            video,
            url: url.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(CatalogError::invalid("related url", "url is empty"));
        }
        check_len("related url", "url", &self.url, MAX_TEXT_LEN)?;
        check_len("related url", "description", &self.description, MAX_TEXT_LEN)
    }
}

impl fmt::Display for RelatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}
