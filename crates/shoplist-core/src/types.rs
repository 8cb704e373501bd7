//! # Domain Types
//!
//! Entities stored by the shopping-list gateway.
//!
//! ## Collections
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Six Collections                                 │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CatalogProduct  │   │    ShopItem     │   │      Unit       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │◄──│  id (same)      │   │  id             │       │
//! │  │  name           │   │  count, bought  │   │  name (unique)  │       │
//! │  │  unit_id ───────┼───┼─────────────────┼──►│                 │       │
//! │  │  category_id    │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ShoppingList   │   │  ShoppingList   │   │    Category     │       │
//! │  │  (lists)        │   │  (archive)      │   │  ─────────────  │       │
//! │  │  products: [    │   │  same shape     │   │  id, name       │       │
//! │  │   ListProduct ] │   │                 │   │  parent_id      │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `ListProduct` is a copy of a catalog entry taken when it was added to a
//! list. Editing the catalog afterwards does not touch existing lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Primary key of every collection.
///
/// Minted from the creation time in milliseconds, see [`crate::ids`].
pub type EntityId = i64;

// =============================================================================
// Unit
// =============================================================================

/// A unit of measure ("pcs", "kg", "l").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Unit {
    pub id: EntityId,
    pub name: String,
}

impl Unit {
    /// Creates a unit.
    pub fn new(id: EntityId, name: impl Into<String>) -> Self {
        Unit {
            id,
            name: name.into(),
        }
    }
}

// =============================================================================
// Category
// =============================================================================

/// A node in the category forest.
///
/// `parent_id == None` marks a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: EntityId,
    /// At most 20 characters, trimmed.
    pub name: String,
    pub parent_id: Option<EntityId>,
}

// =============================================================================
// Catalog Product
// =============================================================================

/// Canonical description of a purchasable item, independent of any list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: EntityId,
    pub name: String,
    /// Reference into the units collection.
    pub unit_id: Option<EntityId>,
    pub category_id: Option<EntityId>,
}

// =============================================================================
// Shop Item
// =============================================================================

/// A line of the flat legacy shopping list.
///
/// Its id equals the id of the catalog product it counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShopItem {
    pub id: EntityId,
    pub name: String,
    pub count: i64,
    pub bought: bool,
    pub unit_id: Option<EntityId>,
    pub category_id: Option<EntityId>,
}

// =============================================================================
// List Product
// =============================================================================

/// A product line embedded in a [`ShoppingList`].
///
/// Also the shape returned by the shop-item/catalog/unit join.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ListProduct {
    pub id: EntityId,
    pub name: String,
    pub count: i64,
    #[serde(default)]
    pub bought: bool,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub category_id: Option<EntityId>,
}

// =============================================================================
// Shopping List
// =============================================================================

/// A named list with its products embedded.
///
/// Active and archived lists share this shape; they live in different
/// collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingList {
    pub id: EntityId,
    pub name: String,
    #[ts(as = "String")]
    pub date_create: DateTime<Utc>,
    pub products: Vec<ListProduct>,
    /// Bumped on every write; used to detect lost updates.
    pub version: i64,
}

impl ShoppingList {
    /// Creates an empty list.
    pub fn new(id: EntityId, name: impl Into<String>, date_create: DateTime<Utc>) -> Self {
        ShoppingList {
            id,
            name: name.into(),
            date_create,
            products: Vec::new(),
            version: 0,
        }
    }

    /// Looks up a product line by id.
    pub fn product(&self, product_id: EntityId) -> Option<&ListProduct> {
        self.products.iter().find(|p| p.id == product_id)
    }
}

/// Which list collection an operation reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Active,
    Archived,
}

impl ListKind {
    /// Maps the UI's `isArchive` flag.
    pub fn from_archive_flag(is_archive: bool) -> Self {
        if is_archive {
            ListKind::Archived
        } else {
            ListKind::Active
        }
    }
}

// =============================================================================
// Inputs
// =============================================================================

/// A product as submitted by the UI for adding to a list or the shop list.
///
/// `id` of `None` or `Some(0)` means "unknown": the gateway resolves it by
/// name or mints a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    #[serde(default)]
    pub id: Option<EntityId>,
    pub name: String,
    pub count: i64,
    /// `None` keeps the bought flag of an existing line.
    #[serde(default)]
    pub bought: Option<bool>,
    #[serde(default)]
    pub unit: Option<Unit>,
    #[serde(default)]
    pub category_id: Option<EntityId>,
}

impl NewProduct {
    /// Creates an input with no id, unit or category.
    pub fn new(name: impl Into<String>, count: i64) -> Self {
        NewProduct {
            id: None,
            name: name.into(),
            count,
            bought: None,
            unit: None,
            category_id: None,
        }
    }

    /// Sets the id.
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the unit.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Sets the category.
    pub fn with_category(mut self, category_id: EntityId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Sets the bought flag explicitly.
    pub fn with_bought(mut self, bought: bool) -> Self {
        self.bought = Some(bought);
        self
    }

    /// The id the caller supplied, treating zero as absent.
    pub fn supplied_id(&self) -> Option<EntityId> {
        self.id.filter(|id| *id != 0)
    }
}

/// Partial update of a catalog product. `None` fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub id: EntityId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit_id: Option<EntityId>,
    #[serde(default)]
    pub category_id: Option<EntityId>,
}

impl ProductPatch {
    /// Applies the patch over an existing record.
    pub fn apply(&self, existing: &CatalogProduct) -> CatalogProduct {
        CatalogProduct {
            id: existing.id,
            name: self.name.clone().unwrap_or_else(|| existing.name.clone()),
            unit_id: self.unit_id.or(existing.unit_id),
            category_id: self.category_id.or(existing.category_id),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
