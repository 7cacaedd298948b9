//! Integration tests for the store and its persistence

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use simple_store::{
    Error, FileStorage, HostStorage, MemoryStorage, Name, Store, StoreConfig, STORAGE_KEY,
};
use std::cell::RefCell;
use std::rc::Rc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn persisting() -> StoreConfig {
    StoreConfig::default().with_persist(true)
}

#[test]
fn crud_round_trip() {
    init_tracing();
    let mut store = Store::default();

    store.add("title", json!("draft")).unwrap();
    store.add(1, json!({"done": false})).unwrap();
    assert!(store.has("title"));
    assert_eq!(store.get("1"), Some(&json!({"done": false})));

    store.update("title", json!("final")).unwrap();
    assert_eq!(store.get("title"), Some(&json!("final")));

    store.delete("title").unwrap();
    assert!(!store.has("title"));
    assert_eq!(store.get("title"), None);
    assert_eq!(store.len(), 1);
}

#[test]
fn effect_receives_new_and_old_values() {
    init_tracing();
    let mut store = Store::default();
    let calls = Rc::new(RefCell::new(Vec::new()));

    let seen = Rc::clone(&calls);
    store
        .add_with_effect("n", json!(10), move |value: &Value, old_value: &Value| {
            seen.borrow_mut().push((value.clone(), old_value.clone()));
            Ok(())
        })
        .unwrap();

    store.update("n", json!(20)).unwrap();

    assert_eq!(*calls.borrow(), [(json!(20), json!(10))]);
    assert_eq!(store.get("n"), Some(&json!(20)));
}

#[test]
fn only_on_mixed_store() {
    let mut store = Store::default();
    store.add("a", json!(1)).unwrap();
    store.add("b", json!(2)).unwrap();

    let selected = store.only(["a", "c"]);
    let expected: Vec<(Name, Option<Value>)> = vec![
        (Name::from("a"), Some(json!(1))),
        (Name::from("c"), None),
    ];

    assert_eq!(selected.into_iter().collect::<Vec<_>>(), expected);
}

#[test]
fn duplicate_rejected_with_persistence_on() {
    init_tracing();
    let storage = MemoryStorage::new();
    let config: StoreConfig =
        serde_json::from_str(r#"{"persist": true, "allowExistingData": false}"#).unwrap();
    let mut store = Store::with_storage(config, storage.clone()).unwrap();

    store.add("k", json!(1)).unwrap();
    let err = store.add("k", json!(2)).unwrap_err();

    assert!(matches!(err, Error::DuplicateKey(_)));
    assert_eq!(err.to_string(), "k already exists in the store");
    assert_eq!(store.get("k"), Some(&json!(1)));
    assert_eq!(storage.item(STORAGE_KEY).as_deref(), Some(r#"{"k":1}"#));
}

#[test]
fn state_survives_across_sessions() {
    init_tracing();
    let storage = MemoryStorage::new();

    {
        let mut first = Store::with_storage(persisting(), storage.clone()).unwrap();
        first.add("x", json!(1)).unwrap();
        first.add("y", json!("s")).unwrap();
        first.add("z", json!([true])).unwrap();
        first.delete("z").unwrap();
    }

    let second: Store = Store::with_storage(persisting(), storage).unwrap();
    let all = second.all();

    assert_eq!(all.len(), 2);
    assert_eq!(all[&Name::from("x")], json!(1));
    assert_eq!(all[&Name::from("y")], json!("s"));
}

#[test]
fn corrupt_blob_fails_construction() {
    let mut storage = MemoryStorage::new();
    storage.set_item(STORAGE_KEY, "{not json").unwrap();

    let result: simple_store::Result<Store> = Store::with_storage(persisting(), storage.clone());
    assert!(matches!(result, Err(Error::CorruptPersistedData(_))));

    // Without persistence the blob is never read.
    let store: Store = Store::with_storage(StoreConfig::default(), storage).unwrap();
    assert!(store.is_empty());
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Todo {
    title: String,
    done: bool,
}

#[test]
fn typed_values_persist_to_files() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();

    {
        let mut store: Store<Todo> =
            Store::with_storage(persisting(), FileStorage::new(dir.path())).unwrap();
        store
            .add(
                "t1",
                Todo {
                    title: "write tests".to_string(),
                    done: false,
                },
            )
            .unwrap();
        store
            .update(
                "t1",
                Todo {
                    title: "write tests".to_string(),
                    done: true,
                },
            )
            .unwrap();
    }

    let blob = std::fs::read_to_string(dir.path().join(format!("{}.json", STORAGE_KEY))).unwrap();
    assert_eq!(blob, r#"{"t1":{"title":"write tests","done":true}}"#);

    let store: Store<Todo> =
        Store::with_storage(persisting(), FileStorage::new(dir.path())).unwrap();
    assert_eq!(store.get("t1").map(|todo| todo.done), Some(true));
}

#[test]
fn effect_error_surfaces_to_caller() {
    let mut store: Store<u32> = Store::default();
    store
        .add_with_effect("limit", 1, |value: &u32, _: &u32| {
            if *value > 10 {
                return Err(format!("{} is over the limit", value).into());
            }
            Ok(())
        })
        .unwrap();

    store.update("limit", 5).unwrap();
    let err = store.update("limit", 11).unwrap_err();

    assert_eq!(
        err.to_string(),
        "Effect bound to limit failed: 11 is over the limit"
    );
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn dynamic_names_are_type_checked() {
    let mut store = Store::default();

    for raw in [json!("a"), json!(2)] {
        let name = Name::try_from(&raw).unwrap();
        store.add(name, raw).unwrap();
    }

    assert!(store.has("a"));
    assert!(store.has("2"));
    assert!(matches!(
        Name::try_from(json!(false)),
        Err(Error::InvalidArgument(_))
    ));
}
