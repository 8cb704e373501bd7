//! # List Repository
//!
//! Active shopping lists and their embedded product lines, plus the move
//! into the archive.
//!
//! ## Read-Modify-Write
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add / update / bought / delete-one / delete-all                       │
//! │                                                                         │
//! │  BEGIN IMMEDIATE                                                        │
//! │   1. SELECT list (NotFound if absent)          version = 4              │
//! │   2. mutate products in memory (shoplist_core::lines)                   │
//! │   3. UPDATE ... SET version = 5                                         │
//! │        WHERE id = ? AND version = 4     ← 0 rows? Conflict              │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The whole list is the unit of consistency. A caller that saves a list it
//! read earlier ([`ListRepository::save_list`]) gets `Conflict` instead of
//! overwriting a change made in between.
//!
//! ## Archiving
//! ```text
//! add_to_archive(id):  BEGIN IMMEDIATE → read lists(id) → INSERT archived_lists
//!                      → DELETE lists(id) → COMMIT
//! ```
//! The delete only runs after the archive insert succeeded; a failed insert
//! rolls everything back and the list stays active.

use std::sync::Arc;

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use shoplist_core::lines::{
    add_or_accumulate, remove_product, replace_product, resolve_line_id, set_bought,
};
use shoplist_core::validation::validate_list_name;
use shoplist_core::{EntityId, IdMinter, ListKind, ListProduct, NewProduct, ShoppingList};

use crate::error::{DbError, DbResult};
use crate::models::{encode_date, encode_products, ListRow};
use crate::repository::catalog::catalog_id_by_name;
use crate::repository::{begin_write, fresh_id};

/// Repository for the `lists` collection.
#[derive(Debug, Clone)]
pub struct ListRepository {
    pool: SqlitePool,
    ids: Arc<IdMinter>,
}

impl ListRepository {
    /// Creates a new ListRepository.
    pub fn new(pool: SqlitePool, ids: Arc<IdMinter>) -> Self {
        ListRepository { pool, ids }
    }

    // =========================================================================
    // Whole Lists
    // =========================================================================

    /// Creates an empty list dated now.
    pub async fn create_list(&self, name: &str) -> DbResult<ShoppingList> {
        let name = validate_list_name(name)?;

        let mut tx = begin_write(&self.pool).await?;

        // An archived list keeps its id, so both tables are checked.
        let id = fresh_id(&mut *tx, &self.ids, &["lists", "archived_lists"]).await?;
        let list = ShoppingList::new(id, name, Utc::now());

        sqlx::query(
            r#"
            INSERT INTO lists (id, name, date_create, products, version)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(list.id)
        .bind(&list.name)
        .bind(encode_date(&list.date_create))
        .bind(encode_products(&list.products)?)
        .bind(list.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(list.id))?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(id = %list.id, name = %list.name, "List created");
        Ok(list)
    }

    /// Gets a list by id.
    ///
    /// ## Returns
    /// * `Ok(Some(list))` - List found
    /// * `Ok(None)` - No such list
    /// * `Err(DbError::Serialization)` - Stored record is malformed
    pub async fn get_one_list(&self, id: EntityId) -> DbResult<Option<ShoppingList>> {
        let mut conn = self.pool.acquire().await?;
        fetch_list(&mut *conn, ListKind::Active, id).await
    }

    /// Returns every active list, oldest first.
    pub async fn get_all_lists(&self) -> DbResult<Vec<ShoppingList>> {
        fetch_all_lists(&self.pool, ListKind::Active).await
    }

    /// Deletes a list. Deleting a missing id is not an error.
    pub async fn delete_list(&self, id: EntityId) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM lists WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, deleted = result.rows_affected(), "List deleted");
        Ok(())
    }

    /// Writes back a list the caller read and modified.
    ///
    /// ## Errors
    /// * `NotFound` - the list no longer exists
    /// * `Conflict` - the list was written since `list` was read
    pub async fn save_list(&self, list: &ShoppingList) -> DbResult<ShoppingList> {
        let mut list = list.clone();
        list.name = validate_list_name(&list.name)?;

        let mut tx = begin_write(&self.pool).await?;

        if fetch_list(&mut *tx, ListKind::Active, list.id).await?.is_none() {
            return Err(DbError::not_found("List", list.id));
        }
        let saved = store(&mut *tx, list).await?;

        tx.commit().await.map_err(DbError::transaction)?;
        Ok(saved)
    }

    // =========================================================================
    // Embedded Products
    // =========================================================================

    /// Adds a product to a list with the running-total rule.
    ///
    /// ## Id Resolution
    /// 1. the supplied id, if non-zero
    /// 2. a line of this list with the same name
    /// 3. a catalog product with the same name
    /// 4. a newly minted id, used by no line of this list and no catalog
    ///    product
    ///
    /// Returns the resulting line.
    pub async fn add_product_to_list(
        &self,
        product: &NewProduct,
        list_id: EntityId,
    ) -> DbResult<ListProduct> {
        let mut tx = begin_write(&self.pool).await?;
        let mut list = load(&mut *tx, list_id).await?;

        let id = match resolve_line_id(&list.products, product) {
            Some(id) => id,
            None => match catalog_id_by_name(&mut *tx, product.name.trim()).await? {
                Some(id) => id,
                None => loop {
                    let id = fresh_id(&mut *tx, &self.ids, &["catalog_products"]).await?;
                    if !list.products.iter().any(|p| p.id == id) {
                        break id;
                    }
                },
            },
        };

        let line = add_or_accumulate(&mut list.products, id, product)?;
        store(&mut *tx, list).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(list_id = %list_id, product_id = %line.id, count = line.count, "Product added to list");
        Ok(line)
    }

    /// Replaces one line of a list.
    ///
    /// ## Errors
    /// * `NotFound` - no such list, or the product is not in it
    pub async fn update_product_in_list(
        &self,
        product: &ListProduct,
        list_id: EntityId,
    ) -> DbResult<ShoppingList> {
        let mut tx = begin_write(&self.pool).await?;
        let mut list = load(&mut *tx, list_id).await?;

        replace_product(&mut list.products, product.clone())?;
        let saved = store(&mut *tx, list).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(list_id = %list_id, product_id = %product.id, "List product updated");
        Ok(saved)
    }

    /// Sets the bought flag of one line.
    ///
    /// ## Errors
    /// * `NotFound` - no such list, or the product is not in it
    pub async fn update_product_bought_status(
        &self,
        list_id: EntityId,
        product_id: EntityId,
        bought: bool,
    ) -> DbResult<ShoppingList> {
        let mut tx = begin_write(&self.pool).await?;
        let mut list = load(&mut *tx, list_id).await?;

        set_bought(&mut list.products, product_id, bought)?;
        let saved = store(&mut *tx, list).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(list_id = %list_id, product_id = %product_id, bought, "Bought status changed");
        Ok(saved)
    }

    /// Removes one line. A product that isn't in the list is ignored.
    pub async fn delete_one_product_from_card(
        &self,
        list_id: EntityId,
        product_id: EntityId,
    ) -> DbResult<ShoppingList> {
        let mut tx = begin_write(&self.pool).await?;
        let mut list = load(&mut *tx, list_id).await?;

        let removed = remove_product(&mut list.products, product_id);
        let saved = store(&mut *tx, list).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(list_id = %list_id, product_id = %product_id, removed, "List product deleted");
        Ok(saved)
    }

    /// Empties a list. The list itself is kept.
    pub async fn delete_all_products_from_card(&self, list_id: EntityId) -> DbResult<ShoppingList> {
        let mut tx = begin_write(&self.pool).await?;
        let mut list = load(&mut *tx, list_id).await?;

        list.products.clear();
        let saved = store(&mut *tx, list).await?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(list_id = %list_id, "List emptied");
        Ok(saved)
    }

    /// Returns the products of an active or archived list.
    ///
    /// A missing list, or one whose products can't be decoded, yields an
    /// empty sequence.
    pub async fn get_products_from_list_by_id(
        &self,
        list_id: EntityId,
        kind: ListKind,
    ) -> DbResult<Vec<ListProduct>> {
        let sql = format!("SELECT products FROM {} WHERE id = ?1", table(kind));
        let raw: Option<String> = sqlx::query_scalar(&sql)
            .bind(list_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(raw) = raw else {
            return Ok(Vec::new());
        };

        match serde_json::from_str(&raw) {
            Ok(products) => Ok(products),
            Err(e) => {
                warn!(list_id = %list_id, kind = ?kind, error = %e, "Malformed list products");
                Ok(Vec::new())
            }
        }
    }

    // =========================================================================
    // Archive
    // =========================================================================

    /// Moves a list into the archive.
    ///
    /// ## Errors
    /// * `NotFound` - no such active list; nothing changes
    /// * `DuplicateKey` - the archive already holds this id; the list stays
    ///   active
    pub async fn add_to_archive(&self, list_id: EntityId) -> DbResult<ShoppingList> {
        let mut tx = begin_write(&self.pool).await?;

        let list = load(&mut *tx, list_id).await?;

        sqlx::query(
            r#"
            INSERT INTO archived_lists (id, name, date_create, products, version)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(list.id)
        .bind(&list.name)
        .bind(encode_date(&list.date_create))
        .bind(encode_products(&list.products)?)
        .bind(list.version)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(list_id))?;

        sqlx::query("DELETE FROM lists WHERE id = ?1")
            .bind(list_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(DbError::transaction)?;

        info!(id = %list_id, "List archived");
        Ok(list)
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Table holding lists of the given kind.
fn table(kind: ListKind) -> &'static str {
    match kind {
        ListKind::Active => "lists",
        ListKind::Archived => "archived_lists",
    }
}

/// Reads one list of the given kind.
pub(crate) async fn fetch_list(
    conn: &mut SqliteConnection,
    kind: ListKind,
    id: EntityId,
) -> DbResult<Option<ShoppingList>> {
    let sql = format!(
        "SELECT id, name, date_create, products, version FROM {} WHERE id = ?1",
        table(kind)
    );
    let row = sqlx::query_as::<_, ListRow>(&sql)
        .bind(id)
        .fetch_optional(conn)
        .await?;

    row.map(ListRow::into_list).transpose()
}

/// Reads every list of the given kind, oldest first.
pub(crate) async fn fetch_all_lists(
    pool: &SqlitePool,
    kind: ListKind,
) -> DbResult<Vec<ShoppingList>> {
    let sql = format!(
        "SELECT id, name, date_create, products, version FROM {} ORDER BY id",
        table(kind)
    );
    let rows = sqlx::query_as::<_, ListRow>(&sql).fetch_all(pool).await?;

    rows.into_iter().map(ListRow::into_list).collect()
}

/// Reads an active list that is about to be modified.
async fn load(conn: &mut SqliteConnection, list_id: EntityId) -> DbResult<ShoppingList> {
    fetch_list(conn, ListKind::Active, list_id)
        .await?
        .ok_or_else(|| DbError::not_found("List", list_id))
}

/// Writes a list back if nobody wrote it since it was read.
///
/// Returns the list with its new version.
async fn store(conn: &mut SqliteConnection, mut list: ShoppingList) -> DbResult<ShoppingList> {
    let result = sqlx::query(
        r#"
        UPDATE lists
        SET name = ?1, products = ?2, version = version + 1
        WHERE id = ?3 AND version = ?4
        "#,
    )
    .bind(&list.name)
    .bind(encode_products(&list.products)?)
    .bind(list.id)
    .bind(list.version)
    .execute(conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::conflict("List", list.id));
    }

    list.version += 1;
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use shoplist_core::Unit;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_list() {
        let repo = setup().await.lists();

        let list = repo.create_list("  Groceries ").await.unwrap();

        assert_eq!(list.name, "Groceries");
        assert!(list.products.is_empty());
        assert_eq!(repo.get_one_list(list.id).await.unwrap(), Some(list.clone()));
        assert_eq!(repo.get_all_lists().await.unwrap(), vec![list]);
    }

    #[tokio::test]
    async fn test_lists_created_together_get_distinct_ids() {
        let repo = setup().await.lists();

        let a = repo.create_list("A").await.unwrap();
        let b = repo.create_list("B").await.unwrap();

        assert!(b.id > a.id);
        assert_eq!(repo.get_all_lists().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_create_list_rejects_blank_name() {
        let repo = setup().await.lists();
        assert!(matches!(repo.create_list(" ").await, Err(DbError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_list() {
        let repo = setup().await.lists();
        let list = repo.create_list("Party").await.unwrap();

        repo.delete_list(list.id).await.unwrap();
        repo.delete_list(list.id).await.unwrap();

        assert_eq!(repo.get_one_list(list.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_add_product_to_list_accumulates_by_name() {
        let repo = setup().await.lists();
        let list = repo.create_list("Groceries").await.unwrap();
        let milk = NewProduct::new("Milk", 1).with_id(0);

        let first = repo.add_product_to_list(&milk, list.id).await.unwrap();
        let second = repo.add_product_to_list(&milk, list.id).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.count, 2);
        let products = repo
            .get_products_from_list_by_id(list.id, ListKind::Active)
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Milk");
        assert_eq!(products[0].count, 2);
    }

    #[tokio::test]
    async fn test_add_product_to_list_takes_catalog_id() {
        let db = setup().await;
        db.catalog()
            .add_product(&NewProduct::new("Bread", 1).with_id(77))
            .await
            .unwrap();
        let list = db.lists().create_list("Bakery run").await.unwrap();

        let line = db
            .lists()
            .add_product_to_list(&NewProduct::new("Bread", 2), list.id)
            .await
            .unwrap();

        assert_eq!(line.id, 77);
    }

    #[tokio::test]
    async fn test_add_product_to_missing_list() {
        let repo = setup().await.lists();
        let err = repo
            .add_product_to_list(&NewProduct::new("Milk", 1), 12345)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_update_product_in_list() {
        let repo = setup().await.lists();
        let list = repo.create_list("Groceries").await.unwrap();
        let line = repo
            .add_product_to_list(&NewProduct::new("Milk", 1).with_id(1), list.id)
            .await
            .unwrap();

        let changed = ListProduct {
            name: "Oat milk".to_string(),
            count: 3,
            unit: Some(Unit::new(4, "l")),
            ..line
        };
        let saved = repo.update_product_in_list(&changed, list.id).await.unwrap();

        assert_eq!(saved.products, vec![changed]);
        assert_eq!(saved.version, 2);
    }

    #[tokio::test]
    async fn test_update_missing_product_in_list() {
        let repo = setup().await.lists();
        let list = repo.create_list("Groceries").await.unwrap();

        let ghost = ListProduct {
            id: 9,
            name: "Ghost".to_string(),
            count: 1,
            bought: false,
            unit: None,
            category_id: None,
        };
        let err = repo.update_product_in_list(&ghost, list.id).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(repo.get_one_list(list.id).await.unwrap().unwrap().version, 0);
    }

    #[tokio::test]
    async fn test_bought_status_touches_one_line() {
        let repo = setup().await.lists();
        let list = repo.create_list("Groceries").await.unwrap();
        repo.add_product_to_list(&NewProduct::new("Milk", 1).with_id(1), list.id)
            .await
            .unwrap();
        repo.add_product_to_list(&NewProduct::new("Bread", 2).with_id(2), list.id)
            .await
            .unwrap();
        let before = repo.get_one_list(list.id).await.unwrap().unwrap();

        let after = repo
            .update_product_bought_status(list.id, 2, true)
            .await
            .unwrap();

        assert_eq!(after.products[0], before.products[0]);
        assert!(after.products[1].bought);
        assert_eq!(after.products[1].count, 2);
        assert_eq!(after.products[1].name, "Bread");
    }

    #[tokio::test]
    async fn test_delete_products_from_card() {
        let repo = setup().await.lists();
        let list = repo.create_list("Groceries").await.unwrap();
        repo.add_product_to_list(&NewProduct::new("Milk", 1).with_id(1), list.id)
            .await
            .unwrap();
        repo.add_product_to_list(&NewProduct::new("Bread", 1).with_id(2), list.id)
            .await
            .unwrap();

        let after_one = repo.delete_one_product_from_card(list.id, 1).await.unwrap();
        assert_eq!(after_one.products.len(), 1);

        let emptied = repo.delete_all_products_from_card(list.id).await.unwrap();
        assert!(emptied.products.is_empty());
        assert_eq!(emptied.name, "Groceries");
        assert_eq!(emptied.date_create, list.date_create);
    }

    #[tokio::test]
    async fn test_save_stale_list_conflicts() {
        let repo = setup().await.lists();
        let list = repo.create_list("Groceries").await.unwrap();
        let stale = repo.get_one_list(list.id).await.unwrap().unwrap();

        repo.add_product_to_list(&NewProduct::new("Milk", 1), list.id)
            .await
            .unwrap();

        let mut renamed = stale.clone();
        renamed.name = "Weekly".to_string();
        let err = repo.save_list(&renamed).await.unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        let fresh = repo.get_one_list(list.id).await.unwrap().unwrap();
        assert_eq!(fresh.products.len(), 1);
        let mut renamed = fresh;
        renamed.name = "Weekly".to_string();
        let saved = repo.save_list(&renamed).await.unwrap();
        assert_eq!(saved.name, "Weekly");
        assert_eq!(saved.version, 2);
    }

    #[tokio::test]
    async fn test_products_of_missing_or_malformed_list_are_empty() {
        let db = setup().await;
        let repo = db.lists();

        assert!(repo
            .get_products_from_list_by_id(1, ListKind::Active)
            .await
            .unwrap()
            .is_empty());

        sqlx::query(
            "INSERT INTO lists (id, name, date_create, products) VALUES (5, 'Bad', '2024-01-01T00:00:00Z', '{oops')",
        )
        .execute(db.pool())
        .await
        .unwrap();

        assert!(repo
            .get_products_from_list_by_id(5, ListKind::Active)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_add_to_archive_moves_list() {
        let db = setup().await;
        let repo = db.lists();
        let list = repo.create_list("Groceries").await.unwrap();
        repo.add_product_to_list(&NewProduct::new("Milk", 1), list.id)
            .await
            .unwrap();
        let current = repo.get_one_list(list.id).await.unwrap().unwrap();

        let archived = repo.add_to_archive(list.id).await.unwrap();

        assert_eq!(archived, current);
        assert_eq!(repo.get_one_list(list.id).await.unwrap(), None);
        assert_eq!(db.archive().get_archived_list(list.id).await.unwrap(), Some(current));
        assert_eq!(
            repo.get_products_from_list_by_id(list.id, ListKind::Archived)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn test_add_to_archive_missing_list() {
        let db = setup().await;
        let kept = db.lists().create_list("Kept").await.unwrap();

        let err = db.lists().add_to_archive(kept.id + 1).await.unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(db.lists().get_all_lists().await.unwrap(), vec![kept]);
        assert!(db.archive().get_all_lists_from_archive().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_to_archive_collision_keeps_list_active() {
        let db = setup().await;
        let list = db.lists().create_list("Groceries").await.unwrap();
        sqlx::query(
            "INSERT INTO archived_lists (id, name, date_create) VALUES (?1, 'Old', '2024-01-01T00:00:00Z')",
        )
        .bind(list.id)
        .execute(db.pool())
        .await
        .unwrap();

        let err = db.lists().add_to_archive(list.id).await.unwrap_err();

        assert!(matches!(err, DbError::DuplicateKey { .. }));
        assert_eq!(db.lists().get_one_list(list.id).await.unwrap(), Some(list));
    }
}
