use shoplist::core::config::ShoplistConfig;
use shoplist::core::error::ShoplistError;
use shoplist::core::storage::{KeyValueStorage, MemoryStorage, SqliteStorage};
use shoplist::core::schemas;
use shoplist::plugins::persistence::PersistenceGateway;
use shoplist::plugins::product::compare_names;
use shoplist::plugins::products::{ProductListStore, ProductState};
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tempfile::tempdir;

fn sqlite_list(root: &std::path::Path) -> ProductListStore {
    let config = ShoplistConfig::default();
    let storage = SqliteStorage::open(root, &config.db_file).unwrap();
    let gateway = PersistenceGateway::new(Box::new(storage), config.storage_key.clone());
    let mut list = ProductListStore::with_gateway(gateway, &config);
    list.hydrate();
    list
}

#[test]
fn test_shopping_trip_lifecycle() {
    let tmp = tempdir().unwrap();
    let t0 = Instant::now();

    // 1. Fill the list
    let mut list = sqlite_list(tmp.path());
    assert!(list.is_empty());
    let milk = list.add("Milk", "4,99", "Lidl", t0).unwrap().id.clone();
    let bread = list.add("Bread", "3.20", "Żabka", t0).unwrap().id.clone();
    let eggs = list.add("eggs", "12", "Biedronka", t0).unwrap().id.clone();
    assert_eq!(list.products()[0].id, eggs);
    assert_eq!(list.get(&milk).unwrap().price, 4.99);

    // 2. Validation leaves everything as it was
    let err = list.add("", "1", "X", t0).unwrap_err();
    assert!(matches!(err, ShoplistError::ValidationError(_)));
    assert_eq!(list.len(), 3);

    // 3. Sort, tick off, start removing
    list.sort();
    let names: Vec<&str> = list.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Bread", "eggs", "Milk"]);
    assert_eq!(list.toggle_purchased(&bread), Some(true));
    assert!(list.remove(&eggs, t0));
    assert_eq!(list.state(&eggs), Some(ProductState::PendingRemoval));
    drop(list);

    // 4. Restart before the removal settled: eggs are still stored
    let mut list = sqlite_list(tmp.path());
    assert_eq!(list.len(), 3);
    assert!(list.get(&bread).unwrap().purchased);
    assert_eq!(list.state(&eggs), Some(ProductState::Active));

    // 5. Remove for real
    list.remove(&eggs, t0);
    list.settle(t0 + Duration::from_secs(1));
    drop(list);

    let list = sqlite_list(tmp.path());
    let names: Vec<&str> = list.products().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["Bread", "Milk"]);
}

#[test]
fn test_sorted_order_is_non_decreasing() {
    let mut list = ProductListStore::new();
    let now = Instant::now();
    for name in [
        "Zucchini", "ananas", "Ćwikła", "cebula", "Łosoś", "lody", "Äpfel", "apple", "Banan",
    ] {
        list.add(name, "1", "S", now).unwrap();
    }
    list.sort();
    let first: Vec<String> = list.products().iter().map(|p| p.id.clone()).collect();
    for pair in list.products().windows(2) {
        assert_ne!(compare_names(&pair[0].name, &pair[1].name), Ordering::Greater);
    }
    list.sort();
    let second: Vec<String> = list.products().iter().map(|p| p.id.clone()).collect();
    assert_eq!(first, second);
}

#[test]
fn test_legacy_slot_is_upgraded_on_next_save() {
    let storage = MemoryStorage::new();
    storage
        .set_item(
            schemas::PRODUCTS_STORAGE_KEY,
            r#"[{"id":"1733000000000","name":"Milk","price":4.99,"store":"Lidl","purchased":false,"isNew":true}]"#,
        )
        .unwrap();
    let gateway = PersistenceGateway::new(Box::new(storage.clone()), schemas::PRODUCTS_STORAGE_KEY);
    let mut list = ProductListStore::with_gateway(gateway, &ShoplistConfig::default());
    assert_eq!(list.hydrate(), 1);

    list.toggle_purchased("1733000000000");
    let raw = storage.peek(schemas::PRODUCTS_STORAGE_KEY).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["schema_version"], 1);
    assert_eq!(value["products"][0]["id"], "1733000000000");
    assert_eq!(value["products"][0]["purchased"], true);
    assert!(value["products"][0].get("isNew").is_none());
}

#[test]
fn test_unreadable_slot_starts_empty_and_is_replaced_on_first_change() {
    let storage = MemoryStorage::new();
    storage
        .set_item(schemas::PRODUCTS_STORAGE_KEY, r#"{"schema_version":99,"products":[]}"#)
        .unwrap();
    let gateway = PersistenceGateway::new(Box::new(storage.clone()), schemas::PRODUCTS_STORAGE_KEY);
    let mut list = ProductListStore::with_gateway(gateway, &ShoplistConfig::default());
    assert_eq!(list.hydrate(), 0);

    // Loading alone does not touch the slot.
    assert!(storage.peek(schemas::PRODUCTS_STORAGE_KEY).unwrap().contains("99"));

    list.add("Milk", "1", "S", Instant::now()).unwrap();
    let raw = storage.peek(schemas::PRODUCTS_STORAGE_KEY).unwrap();
    assert!(raw.starts_with("{\"schema_version\":1,"));
}

#[test]
fn test_custom_grace_period_from_config() {
    let config = ShoplistConfig {
        removal_grace_ms: 0,
        ..ShoplistConfig::default()
    };
    let gateway = PersistenceGateway::new(Box::new(MemoryStorage::new()), "k");
    let mut list = ProductListStore::with_gateway(gateway, &config);
    let now = Instant::now();
    let id = list.add("Milk", "1", "S", now).unwrap().id.clone();
    list.remove(&id, now);
    assert_eq!(list.settle(now), vec![id]);
}
