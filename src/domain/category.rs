//! Categories: the conference or user group a video was recorded at.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_len, check_slug, CategoryId, Permalink, MAX_TEXT_LEN};
use crate::error::{CatalogError, Result};

/// Kind of event series a category describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    /// Conference (e.g. PyCon 2012)
    Conference,

    /// Python user group meeting series
    Pug,
}

impl CategoryKind {
    /// Integer code stored in the database
    pub fn code(self) -> i64 {
        match self {
            CategoryKind::Conference => 1,
            CategoryKind::Pug => 2,
        }
    }

    /// Parse a stored integer code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(CategoryKind::Conference),
            2 => Some(CategoryKind::Pug),
            _ => None,
        }
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            CategoryKind::Conference => "Conference",
            CategoryKind::Pug => "Python User Group",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for CategoryKind {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "conference" | "conf" => Ok(CategoryKind::Conference),
            "pug" | "user-group" | "usergroup" => Ok(CategoryKind::Pug),
            _ => Err(CatalogError::invalid(
                "category",
                format!("unknown kind: {}", s),
            )),
        }
    }
}

/// A conference or user group that owns a set of videos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Row id (None until saved)
    pub id: Option<CategoryId>,

    pub kind: CategoryKind,

    /// Series name, e.g. "PyCon" or "ChiPy"
    pub name: String,

    /// Specific title, e.g. "PyCon 2010"
    pub title: String,

    /// HTML description
    #[serde(default)]
    pub description: String,

    /// Event homepage
    #[serde(default)]
    pub url: String,

    /// Unique URL identifier
    pub slug: String,

    /// Editor notes
    #[serde(default)]
    pub notes: String,

    /// First day of the event, if known
    pub start_date: Option<NaiveDate>,
}

impl Category {
    /// Create an unsaved category
    pub fn new(
        kind: CategoryKind,
        name: impl Into<String>,
        title: impl Into<String>,
        slug: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            kind,
            name: name.into(),
            title: title.into(),
            description: String::new(),
            url: String::new(),
            slug: slug.into(),
            notes: String::new(),
            start_date: None,
        }
    }

    /// Set the HTML description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the homepage URL
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Set the start date
    pub fn with_start_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    /// Check field limits and slug format
    pub fn validate(&self) -> Result<()> {
        check_len("category", "name", &self.name, MAX_TEXT_LEN)?;
        check_len("category", "title", &self.title, MAX_TEXT_LEN)?;
        check_slug("category", &self.slug)
    }

    /// Catalog ordering: by name, then title
    pub fn catalog_order(a: &Self, b: &Self) -> Ordering {
        a.name.cmp(&b.name).then_with(|| a.title.cmp(&b.title))
    }
}

impl Permalink for Category {
    const ROUTE: &'static str = "category";

    fn permalink_id(&self) -> Option<i64> {
        self.id.map(CategoryId::get)
    }

    fn permalink_slug(&self) -> &str {
        &self.slug
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
