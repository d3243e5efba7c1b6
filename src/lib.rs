//! richard - video index catalog
//!
//! Keeps an index of recorded talks: the conferences and user groups they
//! were recorded at, their speakers and tags, downloadable encodings, and
//! related links, stored in a single SQLite database.
//!
//! # Modules
//!
//! - `domain`: Entity types, slugify, permalinks
//! - `store`: SQLite-backed catalog (CatalogStore)
//! - `export`: JSON snapshot of the catalog
//! - `config`: Layered configuration
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! richard category add --kind conference --name PyCon --title "PyCon 2012"
//! richard speaker add "Raymond Hettinger"
//! richard video add "Python's Class Development Toolkit" -c pycon-2012 -s raymond-hettinger
//! richard video list --category pycon-2012
//! ```

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod store;

// Re-export main types at crate root for convenience
pub use domain::{
    slugify, Category, CategoryKind, Download, MediaFormat, Permalink, RelatedUrl, Speaker, Tag,
    Video, VideoState,
};
pub use error::CatalogError;
pub use export::CatalogExport;
pub use store::{CatalogCounts, CatalogStore, VideoFilter};
