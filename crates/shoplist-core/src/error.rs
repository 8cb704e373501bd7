//! # Error Types
//!
//! Domain-specific error types for shoplist-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shoplist-core errors (this file)                                      │
//! │  ├── CoreError        - Rule failures on in-memory entities            │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shoplist-db errors (separate crate)                                   │
//! │  └── DbError          - Storage failures, classified for the UI        │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → UI layer                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::types::EntityId;

// =============================================================================
// Core Error
// =============================================================================

/// Rule failures raised while mutating entities in memory.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A list does not contain the product an operation targets.
    ///
    /// ## When This Occurs
    /// - Updating a line that was removed in the meantime
    /// - Toggling `bought` on an id the list never held
    #[error("Product {product_id} is not in the list")]
    ProductNotInList { product_id: EntityId },

    /// Adding to a running total would overflow the count.
    #[error("Count overflow for product {product_id}")]
    CountOverflow { product_id: EntityId },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Checked before anything is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Category parent would break the forest shape.
    ///
    /// ## When This Occurs
    /// - A category named as its own parent
    /// - A parent that is a descendant of the category being edited
    #[error("Category {id} cannot have parent {parent_id}: {reason}")]
    InvalidParent {
        id: EntityId,
        parent_id: EntityId,
        reason: String,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
