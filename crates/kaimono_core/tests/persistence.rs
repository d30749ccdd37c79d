use kaimono_core::db::{open_db, open_db_in_memory};
use kaimono_core::repo::state_repo::{ITEMS_KEY, TEMPLATES_KEY};
use kaimono_core::{
    Item, KvError, KvResult, KvStore, MemoryKvStore, Placement, SeedPolicy, ServiceConfig,
    ServiceNotice, ShoppingListService, SqliteKvStore, StateRepository, StorageStatus,
};
use std::cell::Cell;

#[test]
fn item_collection_round_trips_in_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = StateRepository::new(SqliteKvStore::try_new(&conn).unwrap());

    let mut candidate = Item::new("1718000000001", "卵", "食品", 12);
    candidate.added = false;
    let items = vec![
        Item::new("1718000000002", "牛乳", "食品", 2),
        candidate,
        Item::new("3", "洗剤", "消えたカテゴリ", 1),
    ];
    repo.save_items(&items).unwrap();

    let loaded = repo.load_items().unwrap();
    assert_eq!(loaded.status, StorageStatus::InitializedNonEmpty);
    assert_eq!(loaded.records, items);
}

#[test]
fn item_wire_shape_matches_the_legacy_record() {
    let kv = MemoryKvStore::new();
    StateRepository::new(&kv)
        .save_items(&[Item::new("1", "牛乳", "食品", 2)])
        .unwrap();

    let json: serde_json::Value = serde_json::from_str(&kv.get_text(ITEMS_KEY).unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"key": "1", "label": "牛乳", "category": "食品", "quantity": 2, "added": true}
        ])
    );
}

#[test]
fn legacy_records_load_without_migration() {
    let kv = MemoryKvStore::new();
    kv.set(
        ITEMS_KEY,
        r#"[{"key":"1719999999999","label":"卵","category":"食品","quantity":1,"added":false}]"#
            .as_bytes(),
    )
    .unwrap();
    kv.set(
        TEMPLATES_KEY,
        r#"[{"id":"1719999999000","label":"卵","category":"食品","defaultQuantity":2}]"#.as_bytes(),
    )
    .unwrap();

    let mut service = ShoppingListService::load(&kv);
    assert_eq!(service.items().len(), 1);
    assert_eq!(service.items()[0].placement(), Placement::Candidate);
    assert_eq!(service.templates()[0].default_quantity, 2);
    assert!(service.take_notices().is_empty());
}

#[test]
fn state_survives_a_database_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kaimono.db");

    let key = {
        let conn = open_db(&path).unwrap();
        let mut service = ShoppingListService::load(SqliteKvStore::try_new(&conn).unwrap());
        let key = service.add_item("パン", "食品", 1).unwrap();
        service.toggle_added(&key).unwrap();
        service.add_template("水", "飲料", 2).unwrap();
        key
    };

    let conn = open_db(&path).unwrap();
    let mut service = ShoppingListService::load(SqliteKvStore::try_new(&conn).unwrap());
    assert_eq!(service.items().len(), 4);
    assert!(!service.item(&key).unwrap().added);
    assert_eq!(service.templates().len(), 1);
}

#[test]
fn corrupt_item_record_falls_back_to_empty_with_notice() {
    let kv = MemoryKvStore::new();
    kv.set(ITEMS_KEY, b"not json").unwrap();

    let mut service = ShoppingListService::load(&kv);
    assert!(service.items().is_empty());
    let notices = service.take_notices();
    assert!(matches!(
        notices.as_slice(),
        [ServiceNotice::LoadFailed { record, .. }] if *record == ITEMS_KEY
    ));
    assert_eq!(kv.get_text(ITEMS_KEY).as_deref(), Some("not json"));

    service.add_item("牛乳", "食品", 1).unwrap();
    let stored = StateRepository::new(&kv).load_items().unwrap();
    assert_eq!(stored.records.len(), 1);
}

#[test]
fn invalid_rows_do_not_discard_their_neighbours() {
    let kv = MemoryKvStore::new();
    kv.set(
        ITEMS_KEY,
        r#"[{"key":"1","label":"牛乳","category":"食品","quantity":3,"added":true},
            {"key":"2","label":"卵","category":"食品","quantity":0,"added":false},
            {"key":"3","label":" ","category":"食品","quantity":1,"added":true}]"#
            .as_bytes(),
    )
    .unwrap();

    let mut service = ShoppingListService::load(&kv);
    let keys: Vec<&str> = service.items().iter().map(|item| item.key.as_str()).collect();
    assert_eq!(keys, ["1", "2"]);
    assert_eq!(service.item("2").unwrap().quantity, 1);
    assert!(matches!(
        service.take_notices().as_slice(),
        [ServiceNotice::RowsDropped { record, reasons }]
            if *record == ITEMS_KEY && reasons.len() == 1
    ));

    service.add_item("パン", "食品", 1).unwrap();
    let stored = StateRepository::new(&kv).load_items().unwrap();
    assert_eq!(stored.records.len(), 3);
    assert!(stored.skipped.is_empty());
    assert!(stored.records.iter().any(|item| item.key == "1" && item.quantity == 3));
}

#[test]
fn seed_policy_decides_what_a_cleared_list_reloads_as() {
    for (policy, expected) in [
        (SeedPolicy::FirstRunOnly, 0),
        (SeedPolicy::ReseedWhenEmpty, 3),
    ] {
        let kv = MemoryKvStore::new();
        let config = ServiceConfig {
            seed_policy: policy,
        };
        let mut service = ShoppingListService::load_with_config(&kv, config);
        assert_eq!(service.items().len(), 3);
        service.clear_all();
        drop(service);

        let reloaded = ShoppingListService::load_with_config(&kv, config);
        assert_eq!(reloaded.items().len(), expected, "policy {policy:?}");
    }
}

#[derive(Default)]
struct WriteFailingKv {
    inner: MemoryKvStore,
    fail_writes: Cell<bool>,
}

impl KvStore for WriteFailingKv {
    fn get(&self, key: &str) -> KvResult<Option<Vec<u8>>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> KvResult<()> {
        if self.fail_writes.get() {
            return Err(KvError::Backend("disk full".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> KvResult<()> {
        self.inner.remove(key)
    }
}

#[test]
fn failed_write_keeps_memory_state_and_queues_notice() {
    let kv = WriteFailingKv::default();
    let mut service = ShoppingListService::load(&kv);
    assert!(service.take_notices().is_empty());

    kv.fail_writes.set(true);
    let key = service.add_item("バター", "食品", 1).unwrap();
    assert!(service.item(&key).is_some());

    let notices = service.take_notices();
    assert_eq!(notices.len(), 1);
    assert!(matches!(
        &notices[0],
        ServiceNotice::SaveFailed { record, message }
            if *record == ITEMS_KEY && message.contains("disk full")
    ));

    kv.fail_writes.set(false);
    service.toggle_added(&key).unwrap();
    assert!(service.take_notices().is_empty());
    let stored = StateRepository::new(&kv.inner).load_items().unwrap();
    assert_eq!(stored.records.len(), 4);
    assert!(stored.records.iter().any(|item| item.key == key && !item.added));
}

#[test]
fn rejected_operations_do_not_write() {
    let kv = WriteFailingKv::default();
    let mut service = ShoppingListService::load(&kv);
    kv.fail_writes.set(true);

    assert!(service.add_item("   ", "食品", 1).is_err());
    assert!(service.toggle_added("missing").is_none());
    assert!(service.add_category("食品", "#fff").is_err());
    assert!(service.take_notices().is_empty());
}
