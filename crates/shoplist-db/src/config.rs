//! # Store Configuration
//!
//! Where the database lives and how the pool is sized.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SHOPLIST_DB_PATH=/data/shoplist.db                                 │
//! │     SHOPLIST_MAX_CONNECTIONS=3                                         │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/shoplist/shoplist.toml (Linux)                           │
//! │     ~/Library/Application Support/app.shoplist.shoplist/...  (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     <platform data dir>/shoplist.db, 5 connections                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # shoplist.toml
//! [database]
//! path = "/home/me/shoplist.db"
//! max_connections = 5
//! min_connections = 1
//! connect_timeout_secs = 30
//! busy_timeout_secs = 5
//! run_migrations = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;

/// Environment variable overriding the database file.
pub const ENV_DB_PATH: &str = "SHOPLIST_DB_PATH";

/// Environment variable overriding the pool size.
pub const ENV_MAX_CONNECTIONS: &str = "SHOPLIST_MAX_CONNECTIONS";

/// File name of the database inside the platform data directory.
pub const DEFAULT_DB_FILE: &str = "shoplist.db";

// =============================================================================
// Database Settings
// =============================================================================

/// The `[database]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Database file. `None` means the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// How long a writer waits for another writer to finish.
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,

    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_busy_timeout() -> u64 {
    5
}

fn default_true() -> bool {
    true
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            busy_timeout_secs: default_busy_timeout(),
            run_migrations: true,
        }
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub database: DatabaseSettings,
}

impl StoreConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`shoplist.toml`), if it exists
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        Self::load_with(config_path, |key| std::env::var(key).ok())
    }

    /// [`StoreConfig::load`] with overrides read through `lookup`.
    pub fn load_with(
        config_path: Option<PathBuf>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> DbResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading store config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(lookup);
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file, creating parent directories.
    pub fn save(&self, config_path: &Path) -> DbResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DbError::Config(e.to_string()))?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| DbError::Config(e.to_string()))?;
        std::fs::write(config_path, contents).map_err(|e| DbError::Config(e.to_string()))?;

        info!(path = ?config_path, "Store config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> DbResult<()> {
        let db = &self.database;

        if db.max_connections == 0 {
            return Err(DbError::Config(
                "max_connections must be greater than 0".into(),
            ));
        }

        if db.min_connections > db.max_connections {
            return Err(DbError::Config(format!(
                "min_connections ({}) exceeds max_connections ({})",
                db.min_connections, db.max_connections
            )));
        }

        if matches!(&db.path, Some(path) if path.as_os_str().is_empty()) {
            return Err(DbError::Config("database path is empty".into()));
        }

        Ok(())
    }

    /// Applies environment-style overrides read through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup(ENV_DB_PATH) {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(max) = lookup(ENV_MAX_CONNECTIONS) {
            match max.parse::<u32>() {
                Ok(max) => self.database.max_connections = max,
                Err(_) => warn!(value = %max, "Ignoring invalid {}", ENV_MAX_CONNECTIONS),
            }
        }
    }

    /// Resolves the database file: the configured path, or the platform
    /// data directory.
    pub fn database_path(&self) -> DbResult<PathBuf> {
        self.database
            .path
            .clone()
            .or_else(Self::default_database_path)
            .ok_or_else(|| DbError::Config("no data directory available".into()))
    }

    /// Builds the pool configuration, creating the database's directory.
    pub fn db_config(&self) -> DbResult<DbConfig> {
        let path = self.database_path()?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| DbError::StorageUnavailable(format!("{}: {e}", parent.display())))?;
        }

        Ok(DbConfig::new(path)
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .connect_timeout(Duration::from_secs(self.database.connect_timeout_secs))
            .busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
            .run_migrations(self.database.run_migrations))
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("app", "shoplist", "shoplist")
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("shoplist.toml"))
    }

    fn default_database_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_dir().join(DEFAULT_DB_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.database.max_connections, 5);
        assert!(config.database.run_migrations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shoplist.toml");
        std::fs::write(
            &path,
            "[database]\npath = \"/tmp/lists.db\"\nmax_connections = 2\n",
        )
        .unwrap();

        let config = StoreConfig::load_with(Some(path.clone()), |_| None).unwrap();
        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/lists.db")));
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.database.busy_timeout_secs, 5);

        let overridden = StoreConfig::load_with(Some(path), |key| {
            (key == ENV_MAX_CONNECTIONS).then(|| "4".to_string())
        })
        .unwrap();
        assert_eq!(overridden.database.max_connections, 4);
    }

    #[test]
    fn test_bad_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shoplist.toml");
        std::fs::write(&path, "[database\nmax_connections = ").unwrap();

        assert!(matches!(
            StoreConfig::load_with(Some(path), |_| None),
            Err(DbError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let mut config = StoreConfig::default();
        config.apply_overrides(|key| match key {
            ENV_DB_PATH => Some("/data/other.db".to_string()),
            ENV_MAX_CONNECTIONS => Some("3".to_string()),
            _ => None,
        });

        assert_eq!(config.database.path, Some(PathBuf::from("/data/other.db")));
        assert_eq!(config.database.max_connections, 3);

        config.apply_overrides(|key| (key == ENV_MAX_CONNECTIONS).then(|| "lots".to_string()));
        assert_eq!(config.database.max_connections, 3);
    }

    #[test]
    fn test_validation() {
        let mut config = StoreConfig::default();

        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        config.database.max_connections = 2;
        config.database.min_connections = 3;
        assert!(config.validate().is_err());

        config.database.min_connections = 1;
        config.database.path = Some(PathBuf::new());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_db_config() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("data").join("shoplist.db");
        let mut config = StoreConfig::default();
        config.database.path = Some(db_path.clone());
        config.database.max_connections = 4;

        let config_path = dir.path().join("conf").join("shoplist.toml");
        config.save(&config_path).unwrap();
        let saved: StoreConfig =
            toml::from_str(&std::fs::read_to_string(&config_path).unwrap()).unwrap();
        assert_eq!(saved, config);

        let db_config = config.db_config().unwrap();
        assert_eq!(db_config.database_path, db_path);
        assert_eq!(db_config.max_connections, 4);
        assert_eq!(db_config.busy_timeout, Duration::from_secs(5));
        assert!(dir.path().join("data").is_dir());
    }
}
