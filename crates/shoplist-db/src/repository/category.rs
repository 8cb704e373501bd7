//! # Category Repository
//!
//! The category forest. Names are normalized on every write; parents are
//! checked so the collection never gains a cycle through this API.
//!
//! Deleting a category is unconditional: children keep their `parent_id`
//! and products keep their `category_id`. The tree builder shows such
//! orphans at root level.

use sqlx::SqlitePool;
use tracing::debug;

use shoplist_core::validation::{normalize_category_name, validate_category_parent};
use shoplist_core::{Category, EntityId};

use crate::error::{DbError, DbResult};
use crate::models::CategoryRow;
use crate::repository::begin_write;

/// Repository for the `categories` collection.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Inserts a category under a caller-chosen id.
    ///
    /// ## Errors
    /// * `DuplicateKey` - the id is taken
    /// * `Validation` - empty name, or the category is its own parent
    pub async fn create_category(
        &self,
        id: EntityId,
        name: &str,
        parent_id: Option<EntityId>,
    ) -> DbResult<Category> {
        let name = normalize_category_name(name)?;
        validate_category_parent(id, parent_id, &[])?;

        debug!(id = %id, name = %name, parent_id = ?parent_id, "Creating category");

        sqlx::query("INSERT INTO categories (id, name, parent_id) VALUES (?1, ?2, ?3)")
            .bind(id)
            .bind(&name)
            .bind(parent_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(id))?;

        Ok(Category {
            id,
            name,
            parent_id,
        })
    }

    /// Renames and re-parents a category.
    ///
    /// Read, check and write happen in one transaction.
    ///
    /// ## Errors
    /// * `NotFound` - no category with this id
    /// * `Validation` - empty name, or the new parent would close a cycle
    pub async fn edit_category(
        &self,
        id: EntityId,
        new_name: &str,
        new_parent_id: Option<EntityId>,
    ) -> DbResult<Category> {
        let name = normalize_category_name(new_name)?;

        let mut tx = begin_write(&self.pool).await?;

        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, parent_id FROM categories",
        )
        .fetch_all(&mut *tx)
        .await?;
        let categories: Vec<Category> = rows.into_iter().map(Category::from).collect();

        if !categories.iter().any(|c| c.id == id) {
            return Err(DbError::not_found("Category", id));
        }

        validate_category_parent(id, new_parent_id, &categories)?;

        sqlx::query("UPDATE categories SET name = ?1, parent_id = ?2 WHERE id = ?3")
            .bind(&name)
            .bind(new_parent_id)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(id = %id, name = %name, parent_id = ?new_parent_id, "Category edited");

        Ok(Category {
            id,
            name,
            parent_id: new_parent_id,
        })
    }

    /// Deletes a category. Deleting a missing id is not an error.
    pub async fn delete_category(&self, id: EntityId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, deleted = result.rows_affected(), "Category deleted");
        Ok(())
    }

    /// Returns every category, in no particular order.
    pub async fn get_all_categories(&self) -> DbResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, parent_id FROM categories",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Category::from).collect())
    }

    /// Gets a category by id.
    pub async fn get_category(&self, id: EntityId) -> DbResult<Option<Category>> {
        let row = sqlx::query_as::<_, CategoryRow>(
            "SELECT id, name, parent_id FROM categories WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Category::from))
    }
}
