//! Category rows.

use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::{write_error, CatalogStore};
use crate::domain::{Category, CategoryId};
use crate::error::{CatalogError, Result};

const CATEGORY_COLUMNS: &str =
    "id, kind, name, title, description, url, slug, notes, start_date";

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: Some(row.get(0)?),
        kind: row.get(1)?,
        name: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        url: row.get(5)?,
        slug: row.get(6)?,
        notes: row.get(7)?,
        start_date: row.get(8)?,
    })
}

impl CatalogStore {
    /// Insert a new category or update an existing one; sets `category.id`
    pub fn save_category(&mut self, category: &mut Category) -> Result<CategoryId> {
        category.validate()?;

        let id = match category.id {
            None => {
                self.conn
                    .execute(
                        "INSERT INTO categories
                            (kind, name, title, description, url, slug, notes, start_date)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                        params![
                            category.kind,
                            category.name,
                            category.title,
                            category.description,
                            category.url,
                            category.slug,
                            category.notes,
                            category.start_date,
                        ],
                    )
                    .map_err(|e| write_error(e, "category", &category.slug))?;
                CategoryId(self.conn.last_insert_rowid())
            }
            Some(id) => {
                let changed = self
                    .conn
                    .execute(
                        "UPDATE categories
                         SET kind = ?1, name = ?2, title = ?3, description = ?4,
                             url = ?5, slug = ?6, notes = ?7, start_date = ?8
                         WHERE id = ?9",
                        params![
                            category.kind,
                            category.name,
                            category.title,
                            category.description,
                            category.url,
                            category.slug,
                            category.notes,
                            category.start_date,
                            id,
                        ],
                    )
                    .map_err(|e| write_error(e, "category", &category.slug))?;
                if changed == 0 {
                    return Err(CatalogError::NotFound {
                        entity: "category",
                        id: id.get(),
                    });
                }
                id
            }
        };

        category.id = Some(id);
        debug!(id = %id, slug = %category.slug, "Saved category");
        Ok(id)
    }

    /// Get a category by id
    pub fn category(&self, id: CategoryId) -> Result<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE id = ?1", CATEGORY_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [id], category_from_row)
            .optional()?)
    }

    /// Get a category by slug
    pub fn category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let sql = format!("SELECT {} FROM categories WHERE slug = ?1", CATEGORY_COLUMNS);
        Ok(self
            .conn
            .query_row(&sql, [slug], category_from_row)
            .optional()?)
    }

    /// All categories ordered by name, then title
    pub fn categories(&self) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {} FROM categories ORDER BY name ASC, title ASC",
            CATEGORY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], category_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Delete a category together with its videos and their related URLs
    pub fn delete_category(&mut self, id: CategoryId) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM categories WHERE id = ?1", [id])?;
        if deleted == 0 {
            return Err(CatalogError::NotFound {
                entity: "category",
                id: id.get(),
            });
        }

        info!(id = %id, "Deleted category");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryKind;
    use chrono::NaiveDate;

    fn pycon() -> Category {
        Category::new(CategoryKind::Conference, "PyCon", "PyCon 2012", "pycon-2012")
            .with_url("https://us.pycon.org/2012/")
            .with_start_date(NaiveDate::from_ymd_opt(2012, 3, 7).unwrap())
    }

    #[test]
    fn test_save_and_get_category() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut category = pycon();

        let id = store.save_category(&mut category).unwrap();
        assert_eq!(category.id, Some(id));

        let loaded = store.category(id).unwrap().unwrap();
        assert_eq!(loaded, category);

        let by_slug = store.category_by_slug("pycon-2012").unwrap().unwrap();
        assert_eq!(by_slug.id, Some(id));
    }

    #[test]
    fn test_update_category() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut category = pycon();
        let id = store.save_category(&mut category).unwrap();

        category.notes = "Santa Clara".to_string();
        store.save_category(&mut category).unwrap();

        let loaded = store.category(id).unwrap().unwrap();
        assert_eq!(loaded.notes, "Santa Clara");
        assert_eq!(store.categories().unwrap().len(), 1);
    }

    #[test]
    fn test_update_missing_category() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut category = pycon();
        category.id = Some(CategoryId(99));

        let err = store.save_category(&mut category).unwrap_err();
        assert!(matches!(err, CatalogError::NotFound { entity: "category", id: 99 }));
    }

    #[test]
    fn test_duplicate_slug_is_conflict() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.save_category(&mut pycon()).unwrap();

        let mut duplicate = Category::new(CategoryKind::Pug, "Other", "Other", "pycon-2012");
        let err = store.save_category(&mut duplicate).unwrap_err();
        assert!(matches!(err, CatalogError::SlugConflict { entity: "category", .. }));
        assert!(duplicate.id.is_none());
    }

    #[test]
    fn test_delete_missing_category() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        assert!(matches!(
            store.delete_category(CategoryId(1)),
            Err(CatalogError::NotFound { .. })
        ));
    }
}
