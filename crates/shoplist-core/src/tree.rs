//! # Category Tree
//!
//! Turns the flat category and catalog collections into a nested forest for
//! display.
//!
//! ## Shape
//! ```text
//! Dairy                (category, root)
//! ├── Cheese           (category)
//! │   └── Gouda        (product)
//! └── Milk             (product)
//! Bread                (product, uncategorized)
//! ```
//!
//! ## Damaged Data
//! Categories may be deleted without touching their children or products.
//! - a category whose parent is gone is shown as a root
//! - a product whose category is gone, or has none, is shown at root level
//! - categories stuck in a parent cycle never reach a root and are left out

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{CatalogProduct, Category, EntityId};

/// What a tree node stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Category,
    Product,
}

/// One node of the display tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TreeNode {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn product(product: &CatalogProduct) -> Self {
        TreeNode {
            id: product.id,
            name: product.name.clone(),
            kind: NodeKind::Product,
            children: Vec::new(),
        }
    }
}

/// Builds the category forest with products hung under their category.
///
/// Within a category, subcategories come first, then products, each in
/// input order.
pub fn build_tree(categories: &[Category], products: &[CatalogProduct]) -> Vec<TreeNode> {
    let known: HashSet<EntityId> = categories.iter().map(|c| c.id).collect();

    let mut subcategories: HashMap<EntityId, Vec<&Category>> = HashMap::new();
    let mut roots = Vec::new();
    for category in categories {
        match category.parent_id {
            Some(parent) if known.contains(&parent) => {
                subcategories.entry(parent).or_default().push(category)
            }
            _ => roots.push(category),
        }
    }

    let mut products_by_category: HashMap<EntityId, Vec<&CatalogProduct>> = HashMap::new();
    let mut loose_products = Vec::new();
    for product in products {
        match product.category_id {
            Some(category) if known.contains(&category) => {
                products_by_category.entry(category).or_default().push(product)
            }
            _ => loose_products.push(product),
        }
    }

    let mut visited = HashSet::new();
    let mut tree: Vec<TreeNode> = roots
        .into_iter()
        .map(|root| category_node(root, &subcategories, &products_by_category, &mut visited))
        .collect();
    tree.extend(loose_products.into_iter().map(TreeNode::product));

    tree
}

fn category_node(
    category: &Category,
    subcategories: &HashMap<EntityId, Vec<&Category>>,
    products: &HashMap<EntityId, Vec<&CatalogProduct>>,
    visited: &mut HashSet<EntityId>,
) -> TreeNode {
    visited.insert(category.id);

    let mut children = Vec::new();
    for child in subcategories.get(&category.id).into_iter().flatten() {
        if !visited.contains(&child.id) {
            children.push(category_node(child, subcategories, products, visited));
        }
    }
    children.extend(
        products
            .get(&category.id)
            .into_iter()
            .flatten()
            .map(|p| TreeNode::product(p)),
    );

    TreeNode {
        id: category.id,
        name: category.name.clone(),
        kind: NodeKind::Category,
        children,
    }
}
