//! # Shop Item Repository
//!
//! The flat, legacy shopping list. Items are added through
//! [`CatalogRepository::add_product`](super::catalog::CatalogRepository::add_product),
//! which keeps the catalog in step; this repository reads the list and
//! replaces it wholesale.

use sqlx::SqlitePool;
use tracing::debug;

use shoplist_core::validation::{validate_count, validate_product_name};
use shoplist_core::ShopItem;

use crate::error::{DbError, DbResult};
use crate::models::ShopItemRow;
use crate::repository::begin_write;

/// Repository for the `shop_items` collection.
#[derive(Debug, Clone)]
pub struct ShopItemRepository {
    pool: SqlitePool,
}

impl ShopItemRepository {
    /// Creates a new ShopItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShopItemRepository { pool }
    }

    /// Returns every shop item, oldest first.
    pub async fn get_all_shop_items(&self) -> DbResult<Vec<ShopItem>> {
        let rows = sqlx::query_as::<_, ShopItemRow>(
            "SELECT id, name, count, bought, unit_id, category_id FROM shop_items ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ShopItem::from).collect())
    }

    /// Replaces the whole shop list with `items`.
    ///
    /// Clear and inserts run in one transaction: a failure leaves the old
    /// list in place. An item id appearing twice fails with `DuplicateKey`.
    pub async fn save_all_products(&self, items: &[ShopItem]) -> DbResult<()> {
        for item in items {
            validate_product_name(&item.name)?;
            validate_count(item.count)?;
        }

        let mut tx = begin_write(&self.pool).await?;

        sqlx::query("DELETE FROM shop_items")
            .execute(&mut *tx)
            .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO shop_items (id, name, count, bought, unit_id, category_id)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(item.id)
            .bind(item.name.trim())
            .bind(item.count)
            .bind(item.bought)
            .bind(item.unit_id)
            .bind(item.category_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| DbError::from(e).with_duplicate_value(item.id))?;
        }

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(count = items.len(), "Shop list replaced");
        Ok(())
    }

    /// Number of shop items.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop_items")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
