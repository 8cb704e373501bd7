//! # Unit Repository
//!
//! Units of measure, keyed by id with a unique name.
//!
//! ## Upsert Rules
//! ```text
//! add_unit({ id: 0, name: "kg" })   name known?  → existing unit returned
//!                                   otherwise    → inserted under a new id
//! add_unit({ id: 5, name: "kilo" }) id 5 known?  → renamed
//!                                   otherwise    → inserted as id 5
//! ```
//! A name already held by another id fails with `DuplicateKey`.

use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::debug;

use shoplist_core::validation::validate_unit_name;
use shoplist_core::{EntityId, IdMinter, Unit};

use crate::error::{DbError, DbResult};
use crate::models::UnitRow;
use crate::repository::{begin_write, fresh_id};

/// Repository for the `units` collection.
#[derive(Debug, Clone)]
pub struct UnitRepository {
    pool: SqlitePool,
    ids: Arc<IdMinter>,
}

impl UnitRepository {
    /// Creates a new UnitRepository.
    pub fn new(pool: SqlitePool, ids: Arc<IdMinter>) -> Self {
        UnitRepository { pool, ids }
    }

    /// Returns every unit, oldest first.
    pub async fn get_all_units(&self) -> DbResult<Vec<Unit>> {
        let rows = sqlx::query_as::<_, UnitRow>("SELECT id, name FROM units ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Unit::from).collect())
    }

    /// Inserts or updates a unit and returns the stored record.
    pub async fn add_unit(&self, unit: &Unit) -> DbResult<Unit> {
        let name = validate_unit_name(&unit.name)?;

        let mut tx = begin_write(&self.pool).await?;

        let id = if unit.id != 0 {
            unit.id
        } else {
            let existing = sqlx::query_scalar::<_, EntityId>("SELECT id FROM units WHERE name = ?1")
                .bind(&name)
                .fetch_optional(&mut *tx)
                .await?;

            if let Some(id) = existing {
                tx.commit().await.map_err(DbError::transaction)?;
                return Ok(Unit::new(id, name));
            }

            fresh_id(&mut *tx, &self.ids, &["units"]).await?
        };

        sqlx::query(
            r#"
            INSERT INTO units (id, name) VALUES (?1, ?2)
            ON CONFLICT(id) DO UPDATE SET name = excluded.name
            "#,
        )
        .bind(id)
        .bind(&name)
        .execute(&mut *tx)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value(&name))?;

        tx.commit().await.map_err(DbError::transaction)?;

        debug!(id = %id, name = %name, "Unit stored");
        Ok(Unit::new(id, name))
    }

    /// Gets a unit by id.
    pub async fn get_unit(&self, id: EntityId) -> DbResult<Option<Unit>> {
        let row = sqlx::query_as::<_, UnitRow>("SELECT id, name FROM units WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Unit::from))
    }
}
