//! End-to-end explorer scenarios against the in-memory store.

use grove::client::{ExplorerSession, LocalTransport, OptimisticPatch, TreeCache};
use grove::store::{MemoryNodeStore, NodeStore};
use grove::tree::edit::find;
use grove::{ApiError, MutationEngine, NodeId};
use std::sync::Arc;

fn engine() -> (Arc<MemoryNodeStore>, MutationEngine) {
    let store = Arc::new(MemoryNodeStore::new());
    let engine = MutationEngine::new(store.clone());
    (store, engine)
}

#[test]
fn empty_store_has_no_forest() {
    let (_, engine) = engine();
    assert!(engine.get_forest().unwrap().is_none());
}

#[test]
fn create_root_persists_a_parentless_folder() {
    let (store, engine) = engine();
    let docs = engine.create_root("Docs").unwrap();
    assert_eq!(docs.name, "Docs");
    assert!(docs.is_folder);
    assert!(docs.items.is_empty());

    let record = store.get(&docs.id).unwrap();
    assert!(record.parent_id.is_none());
    assert!(record.is_folder);
    assert_eq!(store.len().unwrap(), 1);
}

#[test]
fn inserted_child_shows_in_forest() {
    let (_, engine) = engine();
    let docs = engine.create_root("Docs").unwrap();
    engine.insert_child(&docs.id, "readme.txt", false).unwrap();

    let forest = engine.get_forest().unwrap().unwrap();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].name, "Docs");
    assert_eq!(forest[0].items.len(), 1);
    assert_eq!(forest[0].items[0].name, "readme.txt");
    assert!(forest[0].items[0].items.is_empty());
}

#[test]
fn file_parents_reject_children_without_writing() {
    let (store, engine) = engine();
    let docs = engine.create_root("Docs").unwrap();
    let forest = engine.insert_child(&docs.id, "readme.txt", false).unwrap().unwrap();
    let readme = forest[0].items[0].id.clone();
    let before = store.get_all().unwrap();

    let err = engine.insert_child(&readme, "x", true).unwrap_err();
    assert!(matches!(err, ApiError::InvalidOperation(_)));
    assert_eq!(store.get_all().unwrap(), before);
}

#[test]
fn cascade_removes_every_descendant() {
    let (store, engine) = engine();
    let docs = engine.create_root("Docs").unwrap();
    let forest = engine.insert_child(&docs.id, "Sub", true).unwrap().unwrap();
    let sub = forest[0].items[0].id.clone();
    let forest = engine.insert_child(&sub, "file.txt", false).unwrap().unwrap();
    let file = forest[0].items[0].items[0].id.clone();
    engine.insert_child(&sub, "Deeper", true).unwrap();

    let forest = engine.delete_cascade(&sub).unwrap().unwrap();
    assert_eq!(forest.len(), 1);
    assert_eq!(forest[0].name, "Docs");
    assert!(forest[0].items.is_empty());

    assert!(store.get(&file).is_err());
    let remaining = store.get_all().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, docs.id);
}

#[test]
fn failed_rename_restores_client_state() {
    let (_, engine) = engine();
    let docs = engine.create_root("Docs").unwrap();
    let mut cache = TreeCache::new();
    cache.begin_load();
    cache.finish_load(engine.get_forest()).unwrap();
    let before = cache.view().cloned();

    let op = cache.apply_optimistic(OptimisticPatch::Rename {
        id: docs.id.clone(),
        name: "New".to_string(),
    });
    assert_eq!(find(cache.view().unwrap(), &docs.id).unwrap().name, "New");

    let server = engine.rename(&NodeId::from("missing"), grove::NodeEdit::rename("New"));
    assert!(cache.reconcile(op, server).is_err());
    assert_eq!(cache.view().cloned(), before);
    assert!(cache.last_error().is_some());
}

#[tokio::test]
async fn session_walks_through_every_mutation() {
    let (_, engine) = engine();
    let engine = Arc::new(engine);
    let session = ExplorerSession::new(Arc::new(LocalTransport::new(engine.clone())));
    session.ensure_loaded().await.unwrap();

    let docs = session.create_root("Docs").await.unwrap();
    let music = session.create_root("Music").await.unwrap();
    session.insert_child(&docs.id, "Sub", true).await.unwrap();
    let sub = session.forest().unwrap()[0].items[0].id.clone();
    session.insert_child(&sub, "file.txt", false).await.unwrap();
    session.rename(&music.id, "Audio").await.unwrap();

    let subtree = session.fetch_subtree(&docs.id).await.unwrap();
    assert_eq!(subtree.items[0].items[0].name, "file.txt");

    session.delete(&sub).await.unwrap();
    let forest = session.forest().unwrap();
    assert_eq!(forest, engine.get_forest().unwrap().unwrap());
    assert_eq!(forest[1].name, "Audio");
    assert!(forest[0].items.is_empty());
}
