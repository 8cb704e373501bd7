//! # Archive Repository
//!
//! Read access to archived lists. Lists enter the archive only through
//! [`ListRepository::add_to_archive`](super::list::ListRepository::add_to_archive).

use sqlx::SqlitePool;

use shoplist_core::{EntityId, ListKind, ShoppingList};

use crate::error::DbResult;
use crate::repository::list::{fetch_all_lists, fetch_list};

/// Repository for the `archived_lists` collection.
#[derive(Debug, Clone)]
pub struct ArchiveRepository {
    pool: SqlitePool,
}

impl ArchiveRepository {
    /// Creates a new ArchiveRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ArchiveRepository { pool }
    }

    /// Returns every archived list, oldest first.
    pub async fn get_all_lists_from_archive(&self) -> DbResult<Vec<ShoppingList>> {
        fetch_all_lists(&self.pool, ListKind::Archived).await
    }

    /// Gets an archived list by id.
    pub async fn get_archived_list(&self, id: EntityId) -> DbResult<Option<ShoppingList>> {
        let mut conn = self.pool.acquire().await?;
        fetch_list(&mut *conn, ListKind::Archived, id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use shoplist_core::NewProduct;

    #[tokio::test]
    async fn test_archive_lists_in_id_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let first = db.lists().create_list("First").await.unwrap();
        let second = db.lists().create_list("Second").await.unwrap();
        db.lists()
            .add_product_to_list(&NewProduct::new("Milk", 1), second.id)
            .await
            .unwrap();

        db.lists().add_to_archive(second.id).await.unwrap();
        db.lists().add_to_archive(first.id).await.unwrap();

        let archived = db.archive().get_all_lists_from_archive().await.unwrap();
        let names: Vec<&str> = archived.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
        assert_eq!(archived[1].products.len(), 1);
        assert!(db.lists().get_all_lists().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_archived_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert_eq!(db.archive().get_archived_list(1).await.unwrap(), None);
    }
}
