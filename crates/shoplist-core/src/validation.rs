//! # Validation Module
//!
//! Input validation for everything the gateway writes.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI forms                                                     │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Normalization (trim, category name cut)                           │
//! │  └── Business rules (non-negative counts, category forest)             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── PRIMARY KEY / UNIQUE constraints                                  │
//! │  └── NOT NULL constraints                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shoplist_core::validation::{normalize_category_name, validate_count};
//!
//! assert_eq!(normalize_category_name("  Dairy  ").unwrap(), "Dairy");
//! assert!(validate_count(-1).is_err());
//! ```

use std::collections::HashMap;

use crate::error::ValidationError;
use crate::types::{Category, EntityId};
use crate::{MAX_CATEGORY_NAME_LEN, MAX_LIST_NAME_LEN, MAX_PRODUCT_NAME_LEN};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Trims a name and checks it is present and short enough.
fn trimmed_name(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a product name and returns it trimmed.
///
/// ## Example
/// ```rust
/// use shoplist_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name(" Milk ").unwrap(), "Milk");
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    trimmed_name("product name", name, MAX_PRODUCT_NAME_LEN)
}

/// Validates a list name and returns it trimmed.
pub fn validate_list_name(name: &str) -> ValidationResult<String> {
    trimmed_name("list name", name, MAX_LIST_NAME_LEN)
}

/// Validates a unit name and returns it trimmed.
pub fn validate_unit_name(name: &str) -> ValidationResult<String> {
    trimmed_name("unit name", name, MAX_PRODUCT_NAME_LEN)
}

/// Normalizes a category name: trimmed, cut to 20 characters.
///
/// Long names are shortened, not rejected.
///
/// ## Example
/// ```rust
/// use shoplist_core::validation::normalize_category_name;
///
/// let name = normalize_category_name("Frozen ready meals and desserts").unwrap();
/// assert_eq!(name, "Frozen ready meals a");
/// ```
pub fn normalize_category_name(name: &str) -> ValidationResult<String> {
    let cut: String = name.trim().chars().take(MAX_CATEGORY_NAME_LEN).collect();
    let cut = cut.trim_end();

    if cut.is_empty() {
        return Err(ValidationError::Required {
            field: "category name".to_string(),
        });
    }

    Ok(cut.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity. Zero is allowed, negative is not.
pub fn validate_count(count: i64) -> ValidationResult<()> {
    if count < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "count".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Category Forest
// =============================================================================

/// Checks that giving `id` the parent `parent_id` keeps the categories a
/// forest.
///
/// `categories` is the current content of the collection. The walk stops at
/// a root or at a parent that no longer exists.
///
/// ## How It Works
/// ```text
/// edit C: parent := A
///
///   A ─► B ─► C ─► (root)        walk up from A: A, B, C ← hits C: cycle
///   A ─► (root)                  walk up from A: A, root  ← fine
/// ```
pub fn validate_category_parent(
    id: EntityId,
    parent_id: Option<EntityId>,
    categories: &[Category],
) -> ValidationResult<()> {
    let Some(parent_id) = parent_id else {
        return Ok(());
    };

    if parent_id == id {
        return Err(ValidationError::InvalidParent {
            id,
            parent_id,
            reason: "a category cannot be its own parent".to_string(),
        });
    }

    let parents: HashMap<EntityId, Option<EntityId>> =
        categories.iter().map(|c| (c.id, c.parent_id)).collect();

    let mut current = Some(parent_id);
    let mut steps = 0;
    while let Some(node) = current {
        if node == id {
            return Err(ValidationError::InvalidParent {
                id,
                parent_id,
                reason: "the parent is a descendant of this category".to_string(),
            });
        }

        // Existing data may already hold a cycle that does not involve `id`.
        steps += 1;
        if steps > parents.len() {
            break;
        }

        current = parents.get(&node).copied().flatten();
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
