//! End-to-end behavior of the Store Gateway. Each test opens a fresh
//! in-memory database, or a temporary file when it needs several
//! connections or handles.

use std::collections::HashSet;
use std::path::Path;

use shoplist_core::sort::{sort_lists, ListSortKey, SortOrder};
use shoplist_core::tree::{build_tree, NodeKind};
use shoplist_core::{ListKind, NewProduct, Unit};
use shoplist_db::{Database, DbConfig, DbError};

async fn open() -> Database {
    Database::new(DbConfig::in_memory())
        .await
        .expect("in-memory database")
}

async fn open_file(path: &Path) -> Database {
    Database::new(DbConfig::new(path))
        .await
        .expect("file database")
}

// =============================================================================
// Running Totals
// =============================================================================

#[tokio::test]
async fn repeated_add_product_sums_counts_under_one_catalog_entry() {
    let db = open().await;

    for (first, second) in [(1, 1), (2, 5), (0, 3)] {
        db.catalog().delete_all_products().await.unwrap();
        db.shop_items().save_all_products(&[]).await.unwrap();

        let id = 500 + first + second;
        db.catalog()
            .add_product(&NewProduct::new("Apples", first).with_id(id))
            .await
            .unwrap();
        let item = db
            .catalog()
            .add_product(&NewProduct::new("Apples", second).with_id(id))
            .await
            .unwrap();

        assert_eq!(item.count, first + second);
        let catalog = db.catalog().get_all_products_for_select().await.unwrap();
        assert_eq!(catalog.iter().filter(|p| p.id == id).count(), 1);
    }
}

#[tokio::test]
async fn add_product_without_id_reuses_catalog_entry_by_name() {
    let db = open().await;
    let kg = db.units().add_unit(&Unit::new(0, "kg")).await.unwrap();

    let first = db
        .catalog()
        .add_product(&NewProduct::new("Potatoes", 2).with_unit(kg.clone()))
        .await
        .unwrap();
    let second = db
        .catalog()
        .add_product(&NewProduct::new("Potatoes", 3))
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(db.catalog().get_all_products_for_select().await.unwrap().len(), 1);

    let joined = db.catalog().get_all_products().await.unwrap();
    assert_eq!(joined.len(), 1);
    assert_eq!(joined[0].count, 5);
    assert_eq!(joined[0].unit, Some(kg));
}

// =============================================================================
// Archive
// =============================================================================

#[tokio::test]
async fn archiving_moves_the_list_exactly_once() {
    let db = open().await;
    let list = db.lists().create_list("Groceries").await.unwrap();
    db.lists()
        .add_product_to_list(&NewProduct::new("Milk", 1), list.id)
        .await
        .unwrap();
    let before = db.lists().get_one_list(list.id).await.unwrap().unwrap();

    db.lists().add_to_archive(list.id).await.unwrap();

    assert_eq!(db.lists().get_one_list(list.id).await.unwrap(), None);
    assert_eq!(
        db.archive().get_all_lists_from_archive().await.unwrap(),
        vec![before]
    );

    // A second archive attempt finds nothing to move.
    let err = db.lists().add_to_archive(list.id).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(db.archive().get_all_lists_from_archive().await.unwrap().len(), 1);
}

#[tokio::test]
async fn archiving_unknown_list_changes_nothing() {
    let db = open().await;
    let active = db.lists().create_list("Active").await.unwrap();
    let archived = db.lists().create_list("Old").await.unwrap();
    db.lists().add_to_archive(archived.id).await.unwrap();

    let lists_before = db.lists().get_all_lists().await.unwrap();
    let archive_before = db.archive().get_all_lists_from_archive().await.unwrap();

    let err = db.lists().add_to_archive(999).await.unwrap_err();

    assert!(matches!(err, DbError::NotFound { .. }));
    assert_eq!(db.lists().get_all_lists().await.unwrap(), lists_before);
    assert_eq!(
        db.archive().get_all_lists_from_archive().await.unwrap(),
        archive_before
    );
    assert_eq!(lists_before, vec![active]);
}

// =============================================================================
// Embedded Products
// =============================================================================

#[tokio::test]
async fn bought_flag_changes_only_the_target_line() {
    let db = open().await;
    let pcs = db.units().add_unit(&Unit::new(0, "pcs")).await.unwrap();
    let list = db.lists().create_list("Groceries").await.unwrap();
    for (name, count) in [("Milk", 1), ("Bread", 2), ("Eggs", 10)] {
        db.lists()
            .add_product_to_list(
                &NewProduct::new(name, count).with_unit(pcs.clone()),
                list.id,
            )
            .await
            .unwrap();
    }
    let before = db
        .lists()
        .get_products_from_list_by_id(list.id, ListKind::Active)
        .await
        .unwrap();
    let target = before[1].id;

    db.lists()
        .update_product_bought_status(list.id, target, true)
        .await
        .unwrap();

    let after = db
        .lists()
        .get_products_from_list_by_id(list.id, ListKind::Active)
        .await
        .unwrap();
    assert_eq!(after.len(), before.len());
    for (old, new) in before.iter().zip(&after) {
        assert_eq!(old.name, new.name);
        assert_eq!(old.count, new.count);
        assert_eq!(old.unit, new.unit);
        assert_eq!(new.bought, new.id == target);
    }
}

#[tokio::test]
async fn emptying_a_list_keeps_the_list() {
    let db = open().await;
    let list = db.lists().create_list("Groceries").await.unwrap();
    db.lists()
        .add_product_to_list(&NewProduct::new("Milk", 1), list.id)
        .await
        .unwrap();

    db.lists().delete_all_products_from_card(list.id).await.unwrap();

    let products = db
        .lists()
        .get_products_from_list_by_id(list.id, ListKind::Active)
        .await
        .unwrap();
    assert!(products.is_empty());

    let kept = db.lists().get_one_list(list.id).await.unwrap().unwrap();
    assert_eq!(kept.name, "Groceries");
    assert_eq!(kept.date_create, list.date_create);
}

#[tokio::test]
async fn adding_milk_twice_gives_one_line_of_two() {
    let db = open().await;
    let list = db.lists().create_list("Groceries").await.unwrap();
    let milk = NewProduct::new("Milk", 1).with_id(0);

    db.lists().add_product_to_list(&milk, list.id).await.unwrap();
    db.lists().add_product_to_list(&milk, list.id).await.unwrap();

    let products = db
        .lists()
        .get_products_from_list_by_id(list.id, ListKind::Active)
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Milk");
    assert_eq!(products[0].count, 2);
}

#[tokio::test]
async fn catalog_deletion_leaves_list_snapshots() {
    let db = open().await;
    db.catalog()
        .add_product(&NewProduct::new("Milk", 1).with_id(1))
        .await
        .unwrap();
    let list = db.lists().create_list("Groceries").await.unwrap();
    db.lists()
        .add_product_to_list(&NewProduct::new("Milk", 1), list.id)
        .await
        .unwrap();

    db.catalog().delete_all_products().await.unwrap();

    let products = db
        .lists()
        .get_products_from_list_by_id(list.id, ListKind::Active)
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, 1);
}

// =============================================================================
// Display Helpers Over Loaded Data
// =============================================================================

#[tokio::test]
async fn tree_survives_deleted_parent_category() {
    let db = open().await;
    db.categories().create_category(1, "Food", None).await.unwrap();
    db.categories().create_category(2, "Dairy", Some(1)).await.unwrap();
    db.catalog()
        .add_product(&NewProduct::new("Milk", 1).with_id(10).with_category(2))
        .await
        .unwrap();
    db.catalog()
        .add_product(&NewProduct::new("Salt", 1).with_id(11))
        .await
        .unwrap();

    db.categories().delete_category(1).await.unwrap();

    let tree = build_tree(
        &db.categories().get_all_categories().await.unwrap(),
        &db.catalog().get_all_products_for_select().await.unwrap(),
    );

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].name, "Dairy");
    assert_eq!(tree[0].children[0].name, "Milk");
    assert_eq!(tree[1].name, "Salt");
    assert_eq!(tree[1].kind, NodeKind::Product);
}

#[tokio::test]
async fn lists_sort_by_name() {
    let db = open().await;
    db.lists().create_list("weekend").await.unwrap();
    db.lists().create_list("Bakery").await.unwrap();
    db.lists().create_list("apples run").await.unwrap();

    let lists = db.lists().get_all_lists().await.unwrap();
    let sorted = sort_lists(&lists, ListSortKey::Name, SortOrder::Ascending);

    let names: Vec<&str> = sorted.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, ["apples run", "Bakery", "weekend"]);

    let newest_first = sort_lists(&lists, ListSortKey::DateCreated, SortOrder::Descending);
    assert!(newest_first[0].date_create >= newest_first[2].date_create);
}

// =============================================================================
// Concurrent Writers
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_to_one_list_are_all_counted() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_file(&dir.path().join("shoplist.db")).await;
    let list = db.lists().create_list("Groceries").await.unwrap();

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let db = db.clone();
            tokio::spawn(async move {
                db.lists()
                    .add_product_to_list(&NewProduct::new("Milk", 1).with_id(7), list.id)
                    .await
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let products = db
        .lists()
        .get_products_from_list_by_id(list.id, ListKind::Active)
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].count, 20);

    let stored = db.lists().get_one_list(list.id).await.unwrap().unwrap();
    assert_eq!(stored.version, 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_unit_adds_by_name_share_one_unit() {
    let dir = tempfile::tempdir().unwrap();
    let db = open_file(&dir.path().join("shoplist.db")).await;

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let db = db.clone();
            tokio::spawn(async move { db.units().add_unit(&Unit::new(0, "kg")).await })
        })
        .collect();

    let mut ids = HashSet::new();
    for task in tasks {
        ids.insert(task.await.unwrap().unwrap().id);
    }

    assert_eq!(ids.len(), 1);
    assert_eq!(db.units().get_all_units().await.unwrap().len(), 1);
}

#[tokio::test]
async fn two_handles_on_one_file_never_reuse_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shoplist.db");
    let first = open_file(&path).await;
    let second = open_file(&path).await;

    for i in 0..200 {
        first
            .catalog()
            .add_product(&NewProduct::new(format!("A{i}"), 1))
            .await
            .unwrap();
        second
            .catalog()
            .add_product(&NewProduct::new(format!("B{i}"), 1))
            .await
            .unwrap();
    }

    let catalog = first.catalog().get_all_products_for_select().await.unwrap();
    assert_eq!(catalog.len(), 400);
    let names: HashSet<&str> = catalog.iter().map(|p| p.name.as_str()).collect();
    assert!(names.contains("A0") && names.contains("B199"));

    let shop_items = first.shop_items().get_all_shop_items().await.unwrap();
    assert_eq!(shop_items.len(), 400);
    assert!(shop_items.iter().all(|item| item.count == 1));
}

#[tokio::test]
async fn two_handles_create_lists_with_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shoplist.db");
    let first = open_file(&path).await;
    let second = open_file(&path).await;

    for i in 0..50 {
        first.lists().create_list(&format!("first {i}")).await.unwrap();
        let list = second.lists().create_list(&format!("second {i}")).await.unwrap();
        if i % 10 == 0 {
            second.lists().add_to_archive(list.id).await.unwrap();
        }
    }

    assert_eq!(first.lists().get_all_lists().await.unwrap().len(), 95);
    assert_eq!(first.archive().get_all_lists_from_archive().await.unwrap().len(), 5);
}
