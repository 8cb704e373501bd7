//! # Database Error Types
//!
//! Error types for gateway operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)        CoreError (rule failure)            │
//! │       │                                 │                               │
//! │       └────────────────┬────────────────┘                               │
//! │                        ▼                                                │
//! │  DbError (this module) ← Classifies: unavailable, not found,           │
//! │       │                   duplicate key, transaction failed ...         │
//! │       ▼                                                                 │
//! │  UI layer shows a user-facing message                                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing is swallowed here. The only tolerated failures are the empty
//! results documented on the repository methods.

use shoplist_core::{CoreError, ValidationError};
use thiserror::Error;

/// Gateway operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database could not be opened or reached.
    ///
    /// ## When This Occurs
    /// - Database file can't be created (permissions, missing directory)
    /// - Pool closed after shutdown
    /// - Pool timed out waiting for a connection
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Key absent on an operation requiring it to exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Insert collided with an existing key.
    ///
    /// ## When This Occurs
    /// - Creating a category with an id already in use
    /// - Archiving a list whose id is already archived
    /// - Two units with the same name
    #[error("Duplicate {field}: '{value}' already exists")]
    DuplicateKey { field: String, value: String },

    /// The engine aborted or errored inside a transaction.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A list changed between read and write.
    #[error("{entity} {id} was modified concurrently")]
    Conflict { entity: String, id: String },

    /// Input rejected before anything was written.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Stored data could not be (de)serialized.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a DuplicateKey error.
    pub fn duplicate(field: impl Into<String>, value: impl ToString) -> Self {
        DbError::DuplicateKey {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Creates a Conflict error.
    pub fn conflict(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::Conflict {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Wraps a failure to begin or commit a transaction.
    pub fn transaction(err: sqlx::Error) -> Self {
        match DbError::from(err) {
            DbError::Internal(msg) => DbError::TransactionFailed(msg),
            other => other,
        }
    }

    /// Fills in the key of a DuplicateKey raised by SQLite, which only
    /// reports the column.
    pub fn with_duplicate_value(self, value: impl ToString) -> Self {
        match self {
            DbError::DuplicateKey { field, .. } => DbError::DuplicateKey {
                field,
                value: value.to_string(),
            },
            other => other,
        }
    }

    /// Returns true for NotFound.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound       → DbError::NotFound
/// sqlx::Error::Database UNIQUE   → DbError::DuplicateKey
/// sqlx::Error::Database (other)  → DbError::TransactionFailed
/// PoolTimedOut / PoolClosed / Io → DbError::StorageUnavailable
/// Other                          → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite reports "UNIQUE constraint failed: <table>.<column>"
                // for both primary keys and unique indexes.
                if db_err.is_unique_violation() || msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::DuplicateKey {
                        field,
                        value: "unknown".to_string(),
                    }
                } else {
                    DbError::TransactionFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => {
                DbError::StorageUnavailable("Timed out waiting for a connection".to_string())
            }

            sqlx::Error::PoolClosed => DbError::StorageUnavailable("Pool is closed".to_string()),

            sqlx::Error::Io(io) => DbError::StorageUnavailable(io.to_string()),

            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                DbError::Serialization(err.to_string())
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for DbError {
    fn from(err: toml::de::Error) -> Self {
        DbError::Config(err.to_string())
    }
}

/// Rule failures from shoplist-core.
///
/// ```text
/// CoreError::ProductNotInList → DbError::NotFound
/// CoreError::Validation       → DbError::Validation
/// CoreError::CountOverflow    → DbError::TransactionFailed
/// ```
impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotInList { product_id } => DbError::not_found("ListProduct", product_id),
            CoreError::Validation(validation) => DbError::Validation(validation),
            CoreError::CountOverflow { .. } => DbError::TransactionFailed(err.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_errors_are_classified() {
        let err: DbError = CoreError::ProductNotInList { product_id: 7 }.into();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "ListProduct not found: 7");

        let err: DbError = CoreError::Validation(ValidationError::Required {
            field: "name".to_string(),
        })
        .into();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[test]
    fn test_pool_errors_mean_storage_unavailable() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::StorageUnavailable(_)
        ));
        assert!(matches!(
            DbError::transaction(sqlx::Error::PoolTimedOut),
            DbError::StorageUnavailable(_)
        ));
    }

    #[test]
    fn test_duplicate_value_is_filled_in() {
        let err = DbError::duplicate("categories.id", "unknown").with_duplicate_value(5);
        assert_eq!(err.to_string(), "Duplicate categories.id: '5' already exists");
    }
}
