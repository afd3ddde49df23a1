//! Engine over the sled store, including reopen.

use grove::store::{NodeStore, SledNodeStore};
use grove::MutationEngine;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn forest_survives_reopen_in_order() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store");

    let expected = {
        let engine = MutationEngine::new(Arc::new(SledNodeStore::new(&path).unwrap()));
        let docs = engine.create_root("Docs").unwrap();
        for name in ["c.txt", "a.txt", "b.txt"] {
            engine.insert_child(&docs.id, name, false).unwrap();
        }
        engine.create_root("Archive").unwrap();
        engine.get_forest().unwrap()
    };

    let store = Arc::new(SledNodeStore::new(&path).unwrap());
    assert_eq!(store.len().unwrap(), 5);
    let engine = MutationEngine::new(store);
    let forest = engine.get_forest().unwrap();
    assert_eq!(forest, expected);

    let names: Vec<_> = forest.as_ref().unwrap()[0]
        .items
        .iter()
        .map(|n| n.name.as_str())
        .collect();
    assert_eq!(names, vec!["c.txt", "a.txt", "b.txt"]);
}

#[test]
fn new_nodes_after_reopen_sort_last() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store");
    let docs = {
        let engine = MutationEngine::new(Arc::new(SledNodeStore::new(&path).unwrap()));
        let docs = engine.create_root("Docs").unwrap();
        engine.insert_child(&docs.id, "first", false).unwrap();
        docs
    };

    let engine = MutationEngine::new(Arc::new(SledNodeStore::new(&path).unwrap()));
    let forest = engine.insert_child(&docs.id, "second", false).unwrap().unwrap();
    let names: Vec<_> = forest[0].items.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn cascade_clears_sled_records() {
    let engine = MutationEngine::new(Arc::new(SledNodeStore::temporary().unwrap()));
    let docs = engine.create_root("Docs").unwrap();
    let forest = engine.insert_child(&docs.id, "Sub", true).unwrap().unwrap();
    let sub = forest[0].items[0].id.clone();
    engine.insert_child(&sub, "deep.txt", false).unwrap();

    assert!(engine.delete_cascade(&docs.id).unwrap().is_none());
    assert!(engine.store().is_empty().unwrap());
}
