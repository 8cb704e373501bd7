//! # shoplist-core: Pure Domain Logic for Shoplist
//!
//! Entities and rules of the shopping-list store, with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Shoplist Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI layer (external)                          │   │
//! │  │    Product forms ──► List views ──► Archive ──► Category tree   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ shoplist-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   lines   │  │ sort/tree │  │ validation│  │   │
//! │  │   │  Product  │  │  running  │  │  display  │  │   rules   │  │   │
//! │  │   │   List    │  │  totals   │  │  helpers  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    shoplist-db (Store Gateway)                  │   │
//! │  │              SQLite collections, transactions, migrations       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities (Unit, Category, CatalogProduct, ShopItem, ShoppingList)
//! - [`lines`] - Running-total rule and embedded list mutations
//! - [`ids`] - Timestamp id minting
//! - [`validation`] - Input validation and the category forest rule
//! - [`sort`] - Display ordering
//! - [`tree`] - Category tree building
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use shoplist_core::lines::add_or_accumulate;
//! use shoplist_core::NewProduct;
//!
//! let mut products = Vec::new();
//! let apples = NewProduct::new("Apples", 2);
//!
//! add_or_accumulate(&mut products, 1, &apples).unwrap();
//! add_or_accumulate(&mut products, 1, &apples).unwrap();
//!
//! // One line, quantities added up.
//! assert_eq!(products.len(), 1);
//! assert_eq!(products[0].count, 4);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ids;
pub mod lines;
pub mod sort;
pub mod tree;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use ids::IdMinter;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of a category name, in characters.
///
/// Longer names are cut, not rejected.
pub const MAX_CATEGORY_NAME_LEN: usize = 20;

/// Maximum length of a product or unit name, in characters.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;

/// Maximum length of a list name, in characters.
pub const MAX_LIST_NAME_LEN: usize = 100;
