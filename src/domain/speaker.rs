//! Speakers who appear in videos.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{check_len, check_slug, slugify, Permalink, SpeakerId, MAX_TEXT_LEN};
use crate::error::Result;

/// A person presenting in one or more videos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    pub id: Option<SpeakerId>,
    pub name: String,

    /// Unique URL identifier
    pub slug: String,
}

impl Speaker {
    /// Create an unsaved speaker with an explicit slug
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            slug: slug.into(),
        }
    }

    /// Create an unsaved speaker whose slug is derived from the name
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let slug = slugify(&name);
        Self::new(name, slug)
    }

    pub fn validate(&self) -> Result<()> {
        check_len("speaker", "name", &self.name, MAX_TEXT_LEN)?;
        check_slug("speaker", &self.slug)
    }
}

impl Permalink for Speaker {
    const ROUTE: &'static str = "speaker";

    fn permalink_id(&self) -> Option<i64> {
        self.id.map(SpeakerId::get)
    }

    fn permalink_slug(&self) -> &str {
        &self.slug
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_derives_slug() {
        let speaker = Speaker::from_name("Guido van Rossum");
        assert_eq!(speaker.slug, "guido-van-rossum");
        assert!(speaker.validate().is_ok());
    }

    #[test]
    fn test_permalink() {
        let mut speaker = Speaker::new("Jessica McKellar", "jessica-mckellar");
        speaker.id = Some(SpeakerId(3));
        assert_eq!(
            speaker.permalink().as_deref(),
            Some("/speaker/3/jessica-mckellar/")
        );
    }
}
