//! Schema bootstrap for the catalog database.

use rusqlite::Connection;
use tracing::info;

use crate::error::Result;

/// Current schema version
pub const SCHEMA_VERSION: i64 = 1;

/// Bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current_version = schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

/// Get the schema version recorded in the database (0 for a fresh file)
pub fn schema_version(conn: &Connection) -> Result<i64> {
    let table_exists: bool = conn.query_row(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
        [],
        |row| row.get(0),
    )?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;

    Ok(version.unwrap_or(0))
}

fn migrate_v1(conn: &Connection) -> Result<()> {
    info!("Running catalog migration v1");

    conn.execute_batch(
        r#"
        BEGIN;

        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            kind INTEGER NOT NULL CHECK (kind IN (1, 2)),
            name TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            url TEXT NOT NULL DEFAULT '',
            slug TEXT NOT NULL UNIQUE,
            notes TEXT NOT NULL DEFAULT '',
            start_date TEXT
        );

        CREATE TABLE IF NOT EXISTS speakers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS tags (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            tag TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS videos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            state INTEGER CHECK (state IN (1, 2)),
            title TEXT NOT NULL,
            summary TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            category_id INTEGER NOT NULL
                REFERENCES categories(id) ON DELETE CASCADE,
            quality_notes TEXT NOT NULL DEFAULT '',
            copyright_text TEXT,
            embed TEXT,
            thumbnail_url TEXT,
            video_ogv_length INTEGER,
            video_ogv_url TEXT,
            video_mp4_length INTEGER,
            video_mp4_url TEXT,
            video_webm_length INTEGER,
            video_webm_url TEXT,
            source_url TEXT,
            whiteboard TEXT NOT NULL DEFAULT '',
            recorded TEXT,
            added TEXT NOT NULL,
            updated TEXT NOT NULL,
            slug TEXT NOT NULL UNIQUE
        );

        CREATE INDEX IF NOT EXISTS idx_videos_category ON videos(category_id);
        CREATE INDEX IF NOT EXISTS idx_videos_recorded ON videos(recorded);

        CREATE TABLE IF NOT EXISTS video_tags (
            video_id INTEGER NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
            tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
            PRIMARY KEY (video_id, tag_id)
        );

        CREATE TABLE IF NOT EXISTS video_speakers (
            video_id INTEGER NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
            speaker_id INTEGER NOT NULL REFERENCES speakers(id) ON DELETE CASCADE,
            PRIMARY KEY (video_id, speaker_id)
        );

        CREATE TABLE IF NOT EXISTS related_urls (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            video_id INTEGER NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
            url TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_related_urls_video ON related_urls(video_id);

        INSERT INTO schema_version (version) VALUES (1);

        COMMIT;
        "#,
    )?;

    Ok(())
}
