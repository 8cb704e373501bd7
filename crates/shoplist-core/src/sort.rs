//! # Display Ordering
//!
//! Pure reordering helpers for list views. Nothing here touches storage;
//! callers pass in what they already loaded.
//!
//! All sorts are stable, so equal keys keep their stored order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{ListProduct, ShoppingList};

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }
}

/// Keys a product view can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortKey {
    /// Stored order, direction ignored.
    #[default]
    Stored,
    Name,
    Count,
    /// Ids are creation timestamps.
    DateAdded,
}

/// Keys a list overview can be ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ListSortKey {
    /// Stored order, direction ignored.
    #[default]
    Stored,
    Name,
    DateCreated,
}

/// Case-insensitive name order, exact comparison as tie-break.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Returns the products reordered for display.
pub fn sort_products(
    products: &[ListProduct],
    key: ProductSortKey,
    order: SortOrder,
) -> Vec<ListProduct> {
    let mut sorted = products.to_vec();

    match key {
        ProductSortKey::Stored => {}
        ProductSortKey::Name => {
            sorted.sort_by(|a, b| order.apply(compare_names(&a.name, &b.name)));
        }
        ProductSortKey::Count => sorted.sort_by(|a, b| order.apply(a.count.cmp(&b.count))),
        ProductSortKey::DateAdded => sorted.sort_by(|a, b| order.apply(a.id.cmp(&b.id))),
    }

    sorted
}

/// Returns the lists reordered for display.
pub fn sort_lists(lists: &[ShoppingList], key: ListSortKey, order: SortOrder) -> Vec<ShoppingList> {
    let mut sorted = lists.to_vec();

    match key {
        ListSortKey::Stored => {}
        ListSortKey::Name => sorted.sort_by(|a, b| order.apply(compare_names(&a.name, &b.name))),
        ListSortKey::DateCreated => {
            sorted.sort_by(|a, b| order.apply(a.date_create.cmp(&b.date_create)));
        }
    }

    sorted
}
