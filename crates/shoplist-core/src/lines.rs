//! # Product Lines
//!
//! The running-total rule and the mutations applied to a list's embedded
//! product sequence.
//!
//! ## Running Total
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  add "2 apples", then add "2 apples" again                              │
//! │                                                                         │
//! │  ❌ WRONG: two lines          [apples ×2, apples ×2]                    │
//! │  ❌ WRONG: overwrite          [apples ×2]                               │
//! │  ✅ CORRECT: accumulate       [apples ×4]                               │
//! │                                                                         │
//! │  bought: overwritten only when the caller supplies it                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same rule drives the flat shop list and the lists' embedded products,
//! through the [`Tally`] trait.

use crate::error::{CoreError, CoreResult};
use crate::types::{EntityId, ListProduct, NewProduct, ShopItem};
use crate::validation::{validate_count, validate_product_name};

// =============================================================================
// Running Total
// =============================================================================

/// A quantity-bearing line keyed by id.
pub trait Tally {
    fn line_id(&self) -> EntityId;
    fn count(&self) -> i64;
    fn set_count(&mut self, count: i64);
    fn set_bought(&mut self, bought: bool);
}

impl Tally for ShopItem {
    fn line_id(&self) -> EntityId {
        self.id
    }

    fn count(&self) -> i64 {
        self.count
    }

    fn set_count(&mut self, count: i64) {
        self.count = count;
    }

    fn set_bought(&mut self, bought: bool) {
        self.bought = bought;
    }
}

impl Tally for ListProduct {
    fn line_id(&self) -> EntityId {
        self.id
    }

    fn count(&self) -> i64 {
        self.count
    }

    fn set_count(&mut self, count: i64) {
        self.count = count;
    }

    fn set_bought(&mut self, bought: bool) {
        self.bought = bought;
    }
}

/// Adds `count` to an existing line.
///
/// `bought` replaces the line's flag only when it is `Some`.
pub fn accumulate<T: Tally>(line: &mut T, count: i64, bought: Option<bool>) -> CoreResult<()> {
    validate_count(count)?;

    let total = line
        .count()
        .checked_add(count)
        .ok_or(CoreError::CountOverflow {
            product_id: line.line_id(),
        })?;
    line.set_count(total);

    if let Some(bought) = bought {
        line.set_bought(bought);
    }

    Ok(())
}

// =============================================================================
// Embedded Sequence Mutations
// =============================================================================

/// Finds the id an incoming product already has inside this list.
///
/// The supplied id wins; without one, a line with the same trimmed name is
/// reused. `None` means the caller has to look further (catalog, minting).
pub fn resolve_line_id(products: &[ListProduct], incoming: &NewProduct) -> Option<EntityId> {
    if let Some(id) = incoming.supplied_id() {
        return Some(id);
    }

    let name = incoming.name.trim();
    products.iter().find(|p| p.name == name).map(|p| p.id)
}

/// Adds a product to a list under `id`, accumulating onto an existing line.
///
/// Returns the resulting line.
pub fn add_or_accumulate(
    products: &mut Vec<ListProduct>,
    id: EntityId,
    incoming: &NewProduct,
) -> CoreResult<ListProduct> {
    if let Some(existing) = products.iter_mut().find(|p| p.id == id) {
        accumulate(existing, incoming.count, incoming.bought)?;
        return Ok(existing.clone());
    }

    validate_count(incoming.count)?;
    let line = ListProduct {
        id,
        name: validate_product_name(&incoming.name)?,
        count: incoming.count,
        bought: incoming.bought.unwrap_or(false),
        unit: incoming.unit.clone(),
        category_id: incoming.category_id,
    };
    products.push(line.clone());

    Ok(line)
}

/// Replaces the line with the same id as `product`.
pub fn replace_product(products: &mut [ListProduct], product: ListProduct) -> CoreResult<()> {
    validate_count(product.count)?;

    let slot = products
        .iter_mut()
        .find(|p| p.id == product.id)
        .ok_or(CoreError::ProductNotInList {
            product_id: product.id,
        })?;

    *slot = ListProduct {
        name: validate_product_name(&product.name)?,
        ..product
    };

    Ok(())
}

/// Sets the bought flag of one line, leaving every other field alone.
pub fn set_bought(products: &mut [ListProduct], product_id: EntityId, bought: bool) -> CoreResult<()> {
    let line = products
        .iter_mut()
        .find(|p| p.id == product_id)
        .ok_or(CoreError::ProductNotInList { product_id })?;

    line.bought = bought;
    Ok(())
}

/// Removes a line. Returns whether anything was removed.
pub fn remove_product(products: &mut Vec<ListProduct>, product_id: EntityId) -> bool {
    let before = products.len();
    products.retain(|p| p.id != product_id);
    products.len() != before
}

// =============================================================================
// Unit Tests
// =============================================================================
