//! # Store Gateway Handle
//!
//! [`Database`] owns the SQLite pool and the id minter; every repository is
//! handed out from it.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Gateway Lifecycle                           │
//! │                                                                         │
//! │  StoreConfig::load()?.db_config()?        (or DbConfig::in_memory())   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(config)                                                 │
//! │       ├── create shoplist.db if missing                                │
//! │       ├── WAL journal, busy timeout                                    │
//! │       └── apply pending migrations (001 → 003)                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.categories()  db.catalog()  db.shop_items()                        │
//! │  db.units()       db.lists()    db.archive()                           │
//! │       │    all share one SqlitePool and one Arc<IdMinter>              │
//! │       ▼                                                                 │
//! │  db.close()  → later calls fail with StorageUnavailable                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! WAL lets lists be read while another caller writes. Writers take the
//! write lock with `BEGIN IMMEDIATE` and wait up to `busy_timeout` for it,
//! so two callers editing the same list run one after the other.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use shoplist_core::IdMinter;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::archive::ArchiveRepository;
use crate::repository::catalog::CatalogRepository;
use crate::repository::category::CategoryRepository;
use crate::repository::list::ListRepository;
use crate::repository::shop_item::ShopItemRepository;
use crate::repository::unit::UnitRepository;

// =============================================================================
// Configuration
// =============================================================================

/// How to open the gateway.
///
/// Usually built by [`crate::StoreConfig::db_config`]; tests use
/// [`DbConfig::in_memory`].
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database file, created on first open.
    pub database_path: PathBuf,

    /// Pool size. Default: 5
    pub max_connections: u32,

    /// Default: 1
    pub min_connections: u32,

    /// How long `Database::new` and each acquire wait for a connection.
    pub connect_timeout: Duration,

    /// How long a writer waits for the write lock before `database is locked`.
    /// Default: 5 seconds
    pub busy_timeout: Duration,

    pub idle_timeout: Duration,

    /// Apply pending migrations on open. Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// A private in-memory database on a single connection.
    ///
    /// Every call yields a separate, empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Database
// =============================================================================

/// The Store Gateway handle.
///
/// Obtained once at startup and passed to whoever needs storage; there is
/// no global connection. Clones share the pool and the id minter.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
    ids: Arc<IdMinter>,
}

impl Database {
    /// Opens the gateway, creating the file and any missing collection.
    ///
    /// ## Errors
    /// * `StorageUnavailable` - the file can't be opened or created
    /// * `MigrationFailed` - the schema could not be brought up to date
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening store"
        );

        let connect_url = format!("sqlite://{}?mode=rwc", config.database_path.display());

        let connect_options = SqliteConnectOptions::from_str(&connect_url)
            .map_err(|e| DbError::StorageUnavailable(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::StorageUnavailable(e.to_string()))?;

        debug!(
            max_connections = config.max_connections,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Store pool ready"
        );

        let db = Database {
            pool,
            ids: Arc::new(IdMinter::new()),
        };

        if config.run_migrations {
            db.run_migrations().await?;
        }

        Ok(db)
    }

    /// Applies pending migrations. Collections that already exist are left
    /// alone.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// The underlying pool, for queries no repository covers.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn categories(&self) -> CategoryRepository {
        CategoryRepository::new(self.pool.clone())
    }

    /// Catalog products, plus the shop list joined onto them.
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone(), self.ids.clone())
    }

    /// The flat shop list without the catalog join.
    pub fn shop_items(&self) -> ShopItemRepository {
        ShopItemRepository::new(self.pool.clone())
    }

    pub fn units(&self) -> UnitRepository {
        UnitRepository::new(self.pool.clone(), self.ids.clone())
    }

    /// Active lists; also moves them into the archive.
    pub fn lists(&self) -> ListRepository {
        ListRepository::new(self.pool.clone(), self.ids.clone())
    }

    pub fn archive(&self) -> ArchiveRepository {
        ArchiveRepository::new(self.pool.clone())
    }

    /// Reports `(known, applied)` migration counts.
    pub async fn schema_version(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    /// Shuts the pool down. Repository calls made afterwards fail with
    /// `StorageUnavailable`.
    pub async fn close(&self) {
        info!("Closing store");
        self.pool.close().await;
    }

    /// True while the pool can still run a query.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .is_ok()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
