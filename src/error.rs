//! Error type shared by the domain validators and the catalog store.

use thiserror::Error;

/// Errors that can occur while reading or writing the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{entity} slug already in use: {slug}")]
    SlugConflict { entity: &'static str, slug: String },

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid {entity}: {reason}")]
    Invalid { entity: &'static str, reason: String },

    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CatalogError {
    pub(crate) fn invalid(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            entity,
            reason: reason.into(),
        }
    }
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;
