//! # Seed Data Generator
//!
//! Populates a database with demo data for development.
//!
//! ## Usage
//! ```bash
//! # Use shoplist.toml / SHOPLIST_DB_PATH / platform data dir
//! cargo run -p shoplist-db --bin seed
//!
//! # Specify database path
//! cargo run -p shoplist-db --bin seed -- --db ./data/shoplist.db
//!
//! # Specify config file
//! cargo run -p shoplist-db --bin seed -- --config ./shoplist.toml
//! ```
//!
//! ## Generated Data
//! - Units: pcs, kg, l, pack
//! - A small category tree (Food → Dairy → Cheese, Food → Bakery, Household)
//! - Catalog products, each also on the shop list
//! - One active list ("Weekly groceries") and one archived list ("Party")

use std::env;
use std::path::PathBuf;

use shoplist_core::sort::{sort_products, ProductSortKey, SortOrder};
use shoplist_core::tree::{build_tree, TreeNode};
use shoplist_core::{EntityId, ListKind, NewProduct, Unit};
use shoplist_db::{Database, StoreConfig};
use tracing_subscriber::EnvFilter;

/// Units created first; products refer to them by name.
const UNITS: &[&str] = &["pcs", "kg", "l", "pack"];

/// (id, name, parent)
const CATEGORIES: &[(EntityId, &str, Option<EntityId>)] = &[
    (1, "Food", None),
    (2, "Dairy", Some(1)),
    (3, "Cheese", Some(2)),
    (4, "Bakery", Some(1)),
    (5, "Household", None),
];

/// (name, count, unit, category)
const PRODUCTS: &[(&str, i64, &str, EntityId)] = &[
    ("Milk", 2, "l", 2),
    ("Butter", 1, "pack", 2),
    ("Gouda", 1, "kg", 3),
    ("Feta", 1, "pack", 3),
    ("Rye bread", 1, "pcs", 4),
    ("Croissants", 4, "pcs", 4),
    ("Dish soap", 1, "pcs", 5),
    ("Paper towels", 2, "pack", 5),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut db_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Shoplist Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>      Database file path (overrides config)");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let mut config = StoreConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = Some(path);
    }
    let db_config = config.db_config()?;

    println!("🌱 Shoplist Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_config.database_path.display());
    println!();

    let db = Database::new(db_config).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.catalog().get_all_products_for_select().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} catalog products", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        db.close().await;
        return Ok(());
    }

    // Units
    let mut units: Vec<Unit> = Vec::new();
    for name in UNITS {
        units.push(db.units().add_unit(&Unit::new(0, *name)).await?);
    }
    println!("✓ {} units", units.len());

    // Categories
    for (id, name, parent) in CATEGORIES {
        db.categories().create_category(*id, name, *parent).await?;
    }
    println!("✓ {} categories", CATEGORIES.len());

    // Catalog + shop list
    for (name, count, unit_name, category) in PRODUCTS {
        let mut product = NewProduct::new(*name, *count).with_category(*category);
        if let Some(unit) = units.iter().find(|u| u.name == *unit_name) {
            product = product.with_unit(unit.clone());
        }
        db.catalog().add_product(&product).await?;
    }
    println!("✓ {} catalog products", PRODUCTS.len());

    // Lists
    let weekly = db.lists().create_list("Weekly groceries").await?;
    for product in db.catalog().get_all_products().await?.into_iter().take(5) {
        let input = NewProduct {
            id: Some(product.id),
            name: product.name,
            count: product.count,
            bought: None,
            unit: product.unit,
            category_id: product.category_id,
        };
        db.lists().add_product_to_list(&input, weekly.id).await?;
    }

    let party = db.lists().create_list("Party").await?;
    let croissants = db
        .lists()
        .add_product_to_list(&NewProduct::new("Croissants", 12), party.id)
        .await?;
    db.lists()
        .add_product_to_list(&NewProduct::new("Paper towels", 1), party.id)
        .await?;
    db.lists()
        .update_product_bought_status(party.id, croissants.id, true)
        .await?;
    db.lists().add_to_archive(party.id).await?;
    println!("✓ 1 active list, 1 archived list");

    // Show what was written
    println!();
    println!("Category tree:");
    let tree = build_tree(
        &db.categories().get_all_categories().await?,
        &db.catalog().get_all_products_for_select().await?,
    );
    print_tree(&tree, 1);

    println!();
    println!("\"{}\" by name:", weekly.name);
    let products = db
        .lists()
        .get_products_from_list_by_id(weekly.id, ListKind::Active)
        .await?;
    for product in sort_products(&products, ProductSortKey::Name, SortOrder::Ascending) {
        println!("  {} × {}", product.name, product.count);
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

fn print_tree(nodes: &[TreeNode], depth: usize) {
    for node in nodes {
        println!("{}{}", "  ".repeat(depth), node.name);
        print_tree(&node.children, depth + 1);
    }
}

/// Installs the log subscriber. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shoplist=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
