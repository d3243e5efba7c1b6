//! Domain types for the video catalog.
//!
//! - Category: a conference or user group that owns videos
//! - Speaker / Tag: shared references attached to videos
//! - Video: a recorded talk, with a title-derived slug
//! - RelatedUrl: extra links owned by a single video

pub mod category;
pub mod related_url;
pub mod slug;
pub mod speaker;
pub mod tag;
pub mod video;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

pub use category::{Category, CategoryKind};
pub use related_url::RelatedUrl;
pub use slug::{is_valid_slug, slugify};
pub use speaker::Speaker;
pub use tag::Tag;
pub use video::{Download, MediaFormat, Video, VideoState};

/// Maximum length of short text columns (names, titles, urls)
pub const MAX_TEXT_LEN: usize = 255;

/// Maximum length of a tag label
pub const MAX_TAG_LEN: usize = 30;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the raw row id
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Primary key of a category
    CategoryId
);
entity_id!(
    /// Primary key of a speaker
    SpeakerId
);
entity_id!(
    /// Primary key of a tag
    TagId
);
entity_id!(
    /// Primary key of a video
    VideoId
);
entity_id!(
    /// Primary key of a related URL
    RelatedUrlId
);

/// Stable site-relative URL for an entity, built from its id and slug.
pub trait Permalink {
    /// Route name (`category`, `speaker`, `video`)
    const ROUTE: &'static str;

    fn permalink_id(&self) -> Option<i64>;

    fn permalink_slug(&self) -> &str;

    /// `/<route>/<id>/<slug>/`, or `None` if the record has not been saved yet
    fn permalink(&self) -> Option<String> {
        self.permalink_id()
            .map(|id| format!("/{}/{}/{}/", Self::ROUTE, id, self.permalink_slug()))
    }
}

pub(crate) fn check_len(entity: &'static str, field: &str, value: &str, max: usize) -> Result<()> {
    let len = value.chars().count();
    if len > max {
        return Err(CatalogError::invalid(
            entity,
            format!("{} is {} characters, limit is {}", field, len, max),
        ));
    }
    Ok(())
}

pub(crate) fn check_slug(entity: &'static str, slug: &str) -> Result<()> {
    if !is_valid_slug(slug) {
        return Err(CatalogError::invalid(
            entity,
            format!("slug {:?} must match [-a-zA-Z0-9_]+", slug),
        ));
    }
    check_len(entity, "slug", slug, MAX_TEXT_LEN)
}
