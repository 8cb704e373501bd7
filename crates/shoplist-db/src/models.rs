//! # Row Models
//!
//! Flat row shapes read from SQLite and their conversion into domain types.
//!
//! ```text
//! SQLite row ──FromRow──► *Row ──From / into_*──► shoplist_core type
//! ```
//!
//! Lists are the only rows that can fail to convert: their products live in
//! a JSON column and their creation date in an RFC 3339 text column.

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::FromRow;

use shoplist_core::{
    CatalogProduct, Category, EntityId, ListProduct, ShopItem, ShoppingList, Unit,
};

use crate::error::{DbError, DbResult};

// =============================================================================
// Simple Collections
// =============================================================================

#[derive(Debug, FromRow)]
pub(crate) struct CategoryRow {
    pub id: EntityId,
    pub name: String,
    pub parent_id: Option<EntityId>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            parent_id: row.parent_id,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CatalogProductRow {
    pub id: EntityId,
    pub name: String,
    pub unit_id: Option<EntityId>,
    pub category_id: Option<EntityId>,
}

impl From<CatalogProductRow> for CatalogProduct {
    fn from(row: CatalogProductRow) -> Self {
        CatalogProduct {
            id: row.id,
            name: row.name,
            unit_id: row.unit_id,
            category_id: row.category_id,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ShopItemRow {
    pub id: EntityId,
    pub name: String,
    pub count: i64,
    pub bought: bool,
    pub unit_id: Option<EntityId>,
    pub category_id: Option<EntityId>,
}

impl From<ShopItemRow> for ShopItem {
    fn from(row: ShopItemRow) -> Self {
        ShopItem {
            id: row.id,
            name: row.name,
            count: row.count,
            bought: row.bought,
            unit_id: row.unit_id,
            category_id: row.category_id,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UnitRow {
    pub id: EntityId,
    pub name: String,
}

impl From<UnitRow> for Unit {
    fn from(row: UnitRow) -> Self {
        Unit::new(row.id, row.name)
    }
}

// =============================================================================
// Shop Item Join
// =============================================================================

/// One row of the shop item ⋈ catalog ⟕ units join.
///
/// Name and category come from the catalog, quantities from the shop item.
#[derive(Debug, FromRow)]
pub(crate) struct JoinedProductRow {
    pub id: EntityId,
    pub name: String,
    pub count: i64,
    pub bought: bool,
    pub category_id: Option<EntityId>,
    pub unit_id: Option<EntityId>,
    pub unit_name: Option<String>,
}

impl From<JoinedProductRow> for ListProduct {
    fn from(row: JoinedProductRow) -> Self {
        let unit = match (row.unit_id, row.unit_name) {
            (Some(id), Some(name)) => Some(Unit::new(id, name)),
            _ => None,
        };

        ListProduct {
            id: row.id,
            name: row.name,
            count: row.count,
            bought: row.bought,
            unit,
            category_id: row.category_id,
        }
    }
}

// =============================================================================
// Lists
// =============================================================================

/// A row of `lists` or `archived_lists`.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ListRow {
    pub id: EntityId,
    pub name: String,
    pub date_create: String,
    pub products: String,
    pub version: i64,
}

impl ListRow {
    /// Decodes the row. Fails with `Serialization` on a bad date or
    /// products column.
    pub fn into_list(self) -> DbResult<ShoppingList> {
        let date_create = DateTime::parse_from_rfc3339(&self.date_create)
            .map_err(|e| DbError::Serialization(format!("list {}: {e}", self.id)))?
            .with_timezone(&Utc);
        let products: Vec<ListProduct> = serde_json::from_str(&self.products)?;

        Ok(ShoppingList {
            id: self.id,
            name: self.name,
            date_create,
            products,
            version: self.version,
        })
    }
}

/// Storage form of a list creation date.
pub(crate) fn encode_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Storage form of a list's products.
pub(crate) fn encode_products(products: &[ListProduct]) -> DbResult<String> {
    Ok(serde_json::to_string(products)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(products: &str) -> ListRow {
        ListRow {
            id: 1,
            name: "Groceries".to_string(),
            date_create: "2024-05-01T10:00:00.123456789Z".to_string(),
            products: products.to_string(),
            version: 3,
        }
    }

    #[test]
    fn test_list_row_decodes() {
        let list = row(r#"[{"id": 2, "name": "Milk", "count": 1}]"#).into_list().unwrap();

        assert_eq!(list.products.len(), 1);
        assert_eq!(list.version, 3);
        assert_eq!(encode_date(&list.date_create), "2024-05-01T10:00:00.123456789Z");
    }

    #[test]
    fn test_malformed_products_is_serialization_error() {
        let err = row("not json").into_list().unwrap_err();
        assert!(matches!(err, DbError::Serialization(_)));
    }

    #[test]
    fn test_joined_row_needs_both_unit_columns() {
        let joined = JoinedProductRow {
            id: 1,
            name: "Milk".to_string(),
            count: 2,
            bought: false,
            category_id: None,
            unit_id: Some(9),
            unit_name: None,
        };
        assert_eq!(ListProduct::from(joined).unit, None);
    }
}
