//! # Catalog Repository
//!
//! Catalog products and the shop-list view built on top of them.
//!
//! ## Adding a Product
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add_product({ id: 0, name: "Milk", count: 2 })                         │
//! │                                                                         │
//! │  BEGIN IMMEDIATE                                                        │
//! │   1. Resolve id                                                         │
//! │      ├── supplied and non-zero? use it                                  │
//! │      ├── catalog has "Milk"?     adopt its id                           │
//! │      └── otherwise               mint one no row uses yet               │
//! │   2. Upsert catalog_products(id), plain insert for a minted id          │
//! │   3. Upsert shop_items(id) with the running total                       │
//! │      ├── absent:  count = 2, bought = false                             │
//! │      └── present: count += 2, bought kept unless supplied               │
//! │  COMMIT  ← both writes land, or neither does                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Deleting catalog products never touches lists: list lines are snapshots.

use std::sync::Arc;

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use shoplist_core::lines::accumulate;
use shoplist_core::validation::{validate_count, validate_product_name};
use shoplist_core::{
    CatalogProduct, EntityId, IdMinter, ListProduct, NewProduct, ProductPatch, ShopItem,
};

use crate::error::{DbError, DbResult};
use crate::models::{CatalogProductRow, JoinedProductRow, ShopItemRow};
use crate::repository::{begin_write, fresh_id};

/// Repository for the `catalog_products` collection.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
    ids: Arc<IdMinter>,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool, ids: Arc<IdMinter>) -> Self {
        CatalogRepository { pool, ids }
    }

    /// Adds a product to the catalog and to the shop list.
    ///
    /// Catalog and shop list are written in one transaction. Returns the
    /// shop item after the running total was applied.
    ///
    /// ## Example
    /// ```rust,ignore
    /// db.catalog().add_product(&NewProduct::new("Apples", 2)).await?;
    /// let item = db.catalog().add_product(&NewProduct::new("Apples", 2)).await?;
    /// assert_eq!(item.count, 4);
    /// ```
    pub async fn add_product(&self, product: &NewProduct) -> DbResult<ShopItem> {
        let name = validate_product_name(&product.name)?;
        validate_count(product.count)?;
        let unit_id = product.unit.as_ref().map(|u| u.id);

        let mut tx = begin_write(&self.pool).await?;

        let known = match product.supplied_id() {
            Some(id) => Some(id),
            None => catalog_id_by_name(&mut *tx, &name).await?,
        };

        let id = match known {
            Some(id) => {
                sqlx::query(
                    r#"
                    INSERT INTO catalog_products (id, name, unit_id, category_id)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(id) DO UPDATE SET
                        name = excluded.name,
                        unit_id = COALESCE(excluded.unit_id, catalog_products.unit_id),
                        category_id = COALESCE(excluded.category_id, catalog_products.category_id)
                    "#,
                )
                .bind(id)
                .bind(&name)
                .bind(unit_id)
                .bind(product.category_id)
                .execute(&mut *tx)
                .await?;
                id
            }
            None => {
                // A minted id must not land on another product's rows.
                let id =
                    fresh_id(&mut *tx, &self.ids, &["catalog_products", "shop_items"]).await?;
                sqlx::query(
                    "INSERT INTO catalog_products (id, name, unit_id, category_id) VALUES (?1, ?2, ?3, ?4)",
                )
                .bind(id)
                .bind(&name)
                .bind(unit_id)
                .bind(product.category_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| DbError::from(e).with_duplicate_value(id))?;
                id
            }
        };

        let existing = sqlx::query_as::<_, ShopItemRow>(
            "SELECT id, name, count, bought, unit_id, category_id FROM shop_items WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let item = match existing {
            Some(row) => {
                let mut item = ShopItem::from(row);
                accumulate(&mut item, product.count, product.bought)?;
                item.name = name;
                item.unit_id = unit_id.or(item.unit_id);
                item.category_id = product.category_id.or(item.category_id);
                item
            }
            None => ShopItem {
                id,
                name,
                count: product.count,
                bought: product.bought.unwrap_or(false),
                unit_id,
                category_id: product.category_id,
            },
        };

        sqlx::query(
            r#"
            INSERT OR REPLACE INTO shop_items (id, name, count, bought, unit_id, category_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(item.count)
        .bind(item.bought)
        .bind(item.unit_id)
        .bind(item.category_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(id = %item.id, count = item.count, "Product added to shop list");
        Ok(item)
    }

    /// Merges a patch over an existing catalog product.
    ///
    /// ## Errors
    /// * `NotFound` - no product with this id
    pub async fn update_product(&self, patch: &ProductPatch) -> DbResult<CatalogProduct> {
        let mut tx = begin_write(&self.pool).await?;

        let existing = sqlx::query_as::<_, CatalogProductRow>(
            "SELECT id, name, unit_id, category_id FROM catalog_products WHERE id = ?1",
        )
        .bind(patch.id)
        .fetch_optional(&mut *tx)
        .await?
        .map(CatalogProduct::from)
        .ok_or_else(|| DbError::not_found("CatalogProduct", patch.id))?;

        let mut merged = patch.apply(&existing);
        merged.name = validate_product_name(&merged.name)?;

        sqlx::query(
            "UPDATE catalog_products SET name = ?1, unit_id = ?2, category_id = ?3 WHERE id = ?4",
        )
        .bind(&merged.name)
        .bind(merged.unit_id)
        .bind(merged.category_id)
        .bind(merged.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(id = %merged.id, "Catalog product updated");
        Ok(merged)
    }

    /// Deletes one catalog product. Missing ids are ignored.
    pub async fn delete_one_product(&self, id: EntityId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM catalog_products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, deleted = result.rows_affected(), "Catalog product deleted");
        Ok(())
    }

    /// Clears the catalog. Returns how many products were removed.
    pub async fn delete_all_products(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM catalog_products")
            .execute(&self.pool)
            .await?;

        debug!(deleted = result.rows_affected(), "Catalog cleared");
        Ok(result.rows_affected())
    }

    /// Returns the shop list joined with the catalog and units.
    ///
    /// ## Join Rules
    /// - shop items without a catalog entry are dropped (inner join)
    /// - the unit is attached when the catalog's unit id resolves
    /// - name and category come from the catalog, count and bought from the
    ///   shop item
    ///
    /// An empty shop list returns empty without running the join.
    pub async fn get_all_products(&self) -> DbResult<Vec<ListProduct>> {
        let mut tx = self.pool.begin().await.map_err(DbError::transaction)?;

        let shop_items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM shop_items")
            .fetch_one(&mut *tx)
            .await?;

        if shop_items == 0 {
            tx.commit().await.map_err(DbError::transaction)?;
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, JoinedProductRow>(
            r#"
            SELECT
                c.id,
                c.name,
                s.count,
                s.bought,
                c.category_id,
                u.id AS unit_id,
                u.name AS unit_name
            FROM catalog_products c
            INNER JOIN shop_items s ON s.id = c.id
            LEFT JOIN units u ON u.id = c.unit_id
            ORDER BY c.id
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(count = rows.len(), "Joined shop list loaded");
        Ok(rows.into_iter().map(ListProduct::from).collect())
    }

    /// Returns the raw catalog for pick-lists, no join.
    pub async fn get_all_products_for_select(&self) -> DbResult<Vec<CatalogProduct>> {
        let rows = sqlx::query_as::<_, CatalogProductRow>(
            "SELECT id, name, unit_id, category_id FROM catalog_products ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CatalogProduct::from).collect())
    }

    /// Gets a catalog product by id.
    pub async fn get_product(&self, id: EntityId) -> DbResult<Option<CatalogProduct>> {
        let row = sqlx::query_as::<_, CatalogProductRow>(
            "SELECT id, name, unit_id, category_id FROM catalog_products WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CatalogProduct::from))
    }

    /// Finds a catalog product by exact (trimmed) name.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<CatalogProduct>> {
        let row = sqlx::query_as::<_, CatalogProductRow>(
            r#"
            SELECT id, name, unit_id, category_id
            FROM catalog_products
            WHERE name = ?1
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(name.trim())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CatalogProduct::from))
    }
}

/// Looks up a catalog id by name on an open connection or transaction.
///
/// The oldest match wins if the catalog holds the name twice.
pub(crate) async fn catalog_id_by_name(
    conn: &mut SqliteConnection,
    name: &str,
) -> DbResult<Option<EntityId>> {
    let id = sqlx::query_scalar::<_, EntityId>(
        "SELECT id FROM catalog_products WHERE name = ?1 ORDER BY id LIMIT 1",
    )
    .bind(name)
    .fetch_optional(conn)
    .await?;

    Ok(id)
}
