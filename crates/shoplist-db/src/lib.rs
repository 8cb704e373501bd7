//! # shoplist-db: Store Gateway for Shoplist
//!
//! Every read and write of the six persisted collections goes through this
//! crate. It uses SQLite with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shoplist Data Flow                               │
//! │                                                                         │
//! │  UI layer (add to list, archive, edit category ...)                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   shoplist-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CategoryRepo  │    │ 001_...sql   │  │   │
//! │  │   │ SqlitePool    │◄───│ CatalogRepo   │    │ 002_...sql   │  │   │
//! │  │   │ IdMinter      │    │ ListRepo ...  │    │ ...          │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/shoplist/shoplist.db                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, open and close
//! - [`config`] - TOML and environment configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per collection
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shoplist_core::NewProduct;
//! use shoplist_db::{Database, StoreConfig};
//!
//! let config = StoreConfig::load(None)?;
//! let db = Database::new(config.db_config()?).await?;
//!
//! let list = db.lists().create_list("Groceries").await?;
//! db.lists().add_product_to_list(&NewProduct::new("Milk", 1), list.id).await?;
//! db.lists().add_to_archive(list.id).await?;
//!
//! db.close().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
mod models;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::StoreConfig;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::archive::ArchiveRepository;
pub use repository::catalog::CatalogRepository;
pub use repository::category::CategoryRepository;
pub use repository::list::ListRepository;
pub use repository::shop_item::ShopItemRepository;
pub use repository::unit::UnitRepository;
