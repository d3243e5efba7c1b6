//! Free-text tags.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{check_len, TagId, MAX_TAG_LEN};
use crate::error::{CatalogError, Result};

/// A short label attached to videos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Option<TagId>,
    pub tag: String,
}

impl Tag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: None,
            tag: tag.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tag.trim().is_empty() {
            return Err(CatalogError::invalid("tag", "label is empty"));
        }
        check_len("tag", "tag", &self.tag, MAX_TAG_LEN)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)
    }
}
