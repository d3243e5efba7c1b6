//! SQLite-backed catalog store.
//!
//! One table per entity plus `video_tags` / `video_speakers` join tables.
//! Foreign keys are enforced, so deleting a video removes its related URLs
//! and link rows, and deleting a category removes its videos.
//!
//! Reads take `&self`; writes take `&mut self` and run in a transaction.

pub mod categories;
pub mod related_urls;
pub mod schema;
pub mod speakers;
mod sql;
pub mod tags;
pub mod videos;

use std::path::{Path, PathBuf};

use rusqlite::{ffi, Connection};
use serde::Serialize;
use tracing::info;

use crate::error::{CatalogError, Result};

pub use videos::VideoFilter;

/// Row counts per entity kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    pub categories: usize,
    pub speakers: usize,
    pub tags: usize,
    pub videos: usize,
    pub related_urls: usize,
    /// Video-to-tag link rows
    pub video_tags: usize,
    /// Video-to-speaker link rows
    pub video_speakers: usize,
}

/// The video catalog, backed by a single SQLite connection
pub struct CatalogStore {
    conn: Connection,

    /// Database file (None for in-memory stores)
    path: Option<PathBuf>,
}

impl CatalogStore {
    /// Open (or create) a catalog database file and bring its schema up to date
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn, Some(path.to_path_buf()))?;
        info!(path = %path.display(), "Catalog opened");
        Ok(store)
    }

    /// Open a throwaway in-memory catalog
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::run_migrations(&conn)?;
        Ok(Self { conn, path })
    }

    /// Database file path, if file-backed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current schema version
    pub fn schema_version(&self) -> Result<i64> {
        schema::schema_version(&self.conn)
    }

    /// Count rows of every entity kind
    pub fn counts(&self) -> Result<CatalogCounts> {
        let count = |table: &str| -> Result<usize> {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
            Ok(n as usize)
        };

        Ok(CatalogCounts {
            categories: count("categories")?,
            speakers: count("speakers")?,
            tags: count("tags")?,
            videos: count("videos")?,
            related_urls: count("related_urls")?,
            video_tags: count("video_tags")?,
            video_speakers: count("video_speakers")?,
        })
    }
}

/// Translate constraint failures into catalog errors.
///
/// Slug columns are the only UNIQUE constraints in the schema, so a unique
/// violation on a write always means the slug is taken.
pub(crate) fn write_error(err: rusqlite::Error, entity: &'static str, slug: &str) -> CatalogError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        match failure.extended_code {
            ffi::SQLITE_CONSTRAINT_UNIQUE => {
                return CatalogError::SlugConflict {
                    entity,
                    slug: slug.to_string(),
                };
            }
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return CatalogError::InvalidReference(format!(
                    "{} refers to a missing row ({})",
                    entity,
                    message.as_deref().unwrap_or("foreign key constraint failed")
                ));
            }
            _ => {}
        }
    }
    CatalogError::Sqlite(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_creates_file_and_parents() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("nested").join("catalog.db");

        let store = CatalogStore::open(&db_path).unwrap();
        assert!(db_path.exists());
        assert_eq!(store.path(), Some(db_path.as_path()));
        assert_eq!(store.schema_version().unwrap(), schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("catalog.db");

        drop(CatalogStore::open(&db_path).unwrap());
        let store = CatalogStore::open(&db_path).unwrap();
        assert_eq!(store.schema_version().unwrap(), schema::SCHEMA_VERSION);
    }

    #[test]
    fn test_empty_counts() {
        let store = CatalogStore::open_in_memory().unwrap();
        assert_eq!(store.counts().unwrap(), CatalogCounts::default());
    }
}
