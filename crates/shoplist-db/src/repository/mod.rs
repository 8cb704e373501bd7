//! # Repository Module
//!
//! One repository per collection, all reached through [`crate::Database`].
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Store Gateway Repositories                           │
//! │                                                                         │
//! │  UI layer                                                              │
//! │       │                                                                 │
//! │       │  db.lists().add_product_to_list(&product, list_id)             │
//! │       ▼                                                                 │
//! │  ListRepository                                                        │
//! │  ├── load list         (SQL)                                           │
//! │  ├── apply rule        (shoplist_core::lines, pure)                    │
//! │  └── store list        (SQL, version checked)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Business rules stay in shoplist-core; repositories only move rows     │
//! │  and draw transaction boundaries.                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Write Transactions
//! Anything that reads and then writes opens its transaction with
//! [`begin_write`] (`BEGIN IMMEDIATE`). The write lock is taken before the
//! first read, so concurrent writers queue on SQLite's busy timeout instead
//! of failing with `database is locked` when they try to upgrade a read
//! snapshot.
//!
//! ## Available Repositories
//!
//! - [`CategoryRepository`](category::CategoryRepository) - Category forest
//! - [`CatalogRepository`](catalog::CatalogRepository) - Catalog and the joined shop list
//! - [`ShopItemRepository`](shop_item::ShopItemRepository) - Flat shop list
//! - [`UnitRepository`](unit::UnitRepository) - Units of measure
//! - [`ListRepository`](list::ListRepository) - Lists, their products, archiving
//! - [`ArchiveRepository`](archive::ArchiveRepository) - Archived lists

use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};
use tracing::debug;

use shoplist_core::{EntityId, IdMinter};

use crate::error::{DbError, DbResult};

pub mod archive;
pub mod catalog;
pub mod category;
pub mod list;
pub mod shop_item;
pub mod unit;

// =============================================================================
// Shared Transaction Helpers
// =============================================================================

/// Opens a transaction holding the database write lock from the start.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(DbError::transaction)
}

/// Mints an id that no row of `tables` uses yet.
///
/// Must run inside a [`begin_write`] transaction: nobody else can claim the
/// id between this check and the caller's insert. A taken id moves the
/// minter past the largest stored id before minting again.
pub(crate) async fn fresh_id(
    conn: &mut SqliteConnection,
    ids: &IdMinter,
    tables: &[&str],
) -> DbResult<EntityId> {
    'mint: loop {
        let id = ids.mint();

        for table in tables {
            let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)");
            let taken: bool = sqlx::query_scalar(&sql)
                .bind(id)
                .fetch_one(&mut *conn)
                .await?;

            if taken {
                let sql = format!("SELECT MAX(id) FROM {table}");
                let max: Option<EntityId> = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
                ids.skip_past(max.unwrap_or(id).max(id));

                debug!(id = %id, table = %table, "Minted id already stored, minting again");
                continue 'mint;
            }
        }

        return Ok(id);
    }
}
