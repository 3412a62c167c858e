use crate::{MemoryStore, SqliteStore, Store, StoreError, StoreTx};
use sqlx::sqlite::SqliteConnectOptions;
use std::sync::Arc;
use tempfile::TempDir;
use todoit_core::types::{NewToDoItem, ToDoItem, ToDoStatus};

async fn sqlite_store() -> (SqliteStore, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let options = SqliteConnectOptions::new().filename(dir.path().join("todoit.db"));
    let store = SqliteStore::connect_with(options, 4).await.unwrap();
    // Keep the directory alive for as long as the store is used.
    (store, dir)
}

async fn create<S: Store>(store: &S, title: &str, description: &str) -> ToDoItem {
    let mut tx = store.begin().await.unwrap();
    let item = tx.insert(NewToDoItem::new(title, description)).await.unwrap();
    tx.persist().await.unwrap();
    item
}

async fn run_insert_assigns_increasing_ids<S: Store>(store: S) {
    let first = create(&store, "Buy milk", "2%").await;
    let second = create(&store, "Walk dog", "Around the block").await;

    assert!(first.id > 0);
    assert!(second.id > first.id);
    assert_eq!(first.status, ToDoStatus::NotStarted);

    let found = store.find_by_id(first.id).await.unwrap();
    assert_eq!(found, Some(first));
}

async fn run_list_returns_every_item<S: Store>(store: S) {
    assert!(store.list_all().await.unwrap().is_empty());

    let a = create(&store, "a", "first").await;
    let b = create(&store, "b", "second").await;

    let ids: Vec<_> = store.list_all().await.unwrap().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![a.id, b.id]);
}

async fn run_update_overwrites_whole_record<S: Store>(store: S) {
    let item = create(&store, "Buy milk", "2%").await;

    let mut tx = store.begin().await.unwrap();
    let mut loaded = tx.find_by_id(item.id).await.unwrap().unwrap();
    loaded.description = "2% organic".into();
    loaded.status = ToDoStatus::Done;
    tx.update(&loaded).await.unwrap();
    tx.persist().await.unwrap();

    let stored = store.find_by_id(item.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Buy milk");
    assert_eq!(stored.description, "2% organic");
    assert_eq!(stored.status, ToDoStatus::Done);
}

async fn run_remove_deletes_and_never_reuses_ids<S: Store>(store: S) {
    let first = create(&store, "a", "first").await;
    let second = create(&store, "b", "second").await;

    let mut tx = store.begin().await.unwrap();
    tx.remove(&second).await.unwrap();
    tx.persist().await.unwrap();

    assert_eq!(store.find_by_id(second.id).await.unwrap(), None);

    let third = create(&store, "c", "third").await;
    assert!(third.id > second.id);
    assert_ne!(third.id, first.id);
}

async fn run_dropped_tx_is_rolled_back<S: Store>(store: S) {
    let item = create(&store, "keep", "me").await;

    {
        let mut tx = store.begin().await.unwrap();
        tx.insert(NewToDoItem::new("ghost", "never persisted"))
            .await
            .unwrap();
        tx.remove(&item).await.unwrap();
        // dropped without persist
    }

    let all = store.list_all().await.unwrap();
    assert_eq!(all, vec![item]);
}

async fn run_tx_sees_its_own_writes<S: Store>(store: S) {
    let mut tx = store.begin().await.unwrap();
    let item = tx.insert(NewToDoItem::new("a", "b")).await.unwrap();
    assert_eq!(tx.find_by_id(item.id).await.unwrap(), Some(item.clone()));

    tx.remove(&item).await.unwrap();
    assert_eq!(tx.find_by_id(item.id).await.unwrap(), None);
    tx.persist().await.unwrap();

    assert!(store.list_all().await.unwrap().is_empty());
}

async fn run_writes_to_missing_items_are_stale<S: Store>(store: S) {
    let phantom = NewToDoItem::new("nope", "nope").with_id(404);
    let mut tx = store.begin().await.unwrap();

    let err = tx.update(&phantom).await.unwrap_err();
    assert!(matches!(err, StoreError::Stale { id: 404 }));

    let err = tx.remove(&phantom).await.unwrap_err();
    assert!(matches!(err, StoreError::Stale { id: 404 }));
}

async fn run_concurrent_writers_all_commit<S: Store>(store: S) {
    let store = Arc::new(store);
    let mut ids = Vec::new();
    for i in 0..16 {
        ids.push(create(&*store, &format!("item {i}"), "before").await.id);
    }

    let mut tasks = Vec::new();
    for round in 0..4 {
        for &id in &ids {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                let mut tx = store.begin().await?;
                let Some(mut item) = tx.find_by_id(id).await? else {
                    return Ok(());
                };
                item.description = format!("round {round}");
                item.status = ToDoStatus::InProgress;
                tx.update(&item).await?;
                tx.persist().await
            }));
        }
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let all = store.list_all().await.unwrap();
    assert_eq!(all.len(), ids.len());
    assert!(all.iter().all(|i| i.status == ToDoStatus::InProgress));

    let mut tasks = Vec::new();
    for &id in &ids {
        let store = Arc::clone(&store);
        tasks.push(tokio::spawn(async move {
            let mut tx = store.begin().await?;
            if let Some(item) = tx.find_by_id(id).await? {
                tx.remove(&item).await?;
            }
            tx.persist().await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn memory_insert_assigns_increasing_ids() {
    run_insert_assigns_increasing_ids(MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_list_returns_every_item() {
    run_list_returns_every_item(MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_update_overwrites_whole_record() {
    run_update_overwrites_whole_record(MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_remove_deletes_and_never_reuses_ids() {
    run_remove_deletes_and_never_reuses_ids(MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_dropped_tx_is_rolled_back() {
    run_dropped_tx_is_rolled_back(MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_tx_sees_its_own_writes() {
    run_tx_sees_its_own_writes(MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_writes_to_missing_items_are_stale() {
    run_writes_to_missing_items_are_stale(MemoryStore::new()).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn memory_concurrent_writers_all_commit() {
    run_concurrent_writers_all_commit(MemoryStore::new()).await;
}

#[tokio::test]
async fn memory_clones_share_state() {
    let store = MemoryStore::new();
    let item = create(&store.clone(), "shared", "state").await;
    assert_eq!(store.find_by_id(item.id).await.unwrap(), Some(item));
}

#[tokio::test]
async fn sqlite_insert_assigns_increasing_ids() {
    let (store, _dir) = sqlite_store().await;
    run_insert_assigns_increasing_ids(store).await;
}

#[tokio::test]
async fn sqlite_list_returns_every_item() {
    let (store, _dir) = sqlite_store().await;
    run_list_returns_every_item(store).await;
}

#[tokio::test]
async fn sqlite_update_overwrites_whole_record() {
    let (store, _dir) = sqlite_store().await;
    run_update_overwrites_whole_record(store).await;
}

#[tokio::test]
async fn sqlite_remove_deletes_and_never_reuses_ids() {
    let (store, _dir) = sqlite_store().await;
    run_remove_deletes_and_never_reuses_ids(store).await;
}

#[tokio::test]
async fn sqlite_dropped_tx_is_rolled_back() {
    let (store, _dir) = sqlite_store().await;
    run_dropped_tx_is_rolled_back(store).await;
}

#[tokio::test]
async fn sqlite_tx_sees_its_own_writes() {
    let (store, _dir) = sqlite_store().await;
    run_tx_sees_its_own_writes(store).await;
}

#[tokio::test]
async fn sqlite_writes_to_missing_items_are_stale() {
    let (store, _dir) = sqlite_store().await;
    run_writes_to_missing_items_are_stale(store).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn sqlite_concurrent_writers_all_commit() {
    let (store, _dir) = sqlite_store().await;
    run_concurrent_writers_all_commit(store).await;
}

#[tokio::test]
async fn sqlite_data_survives_reconnect() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todoit.db");

    let store = SqliteStore::connect_with(SqliteConnectOptions::new().filename(&path), 1)
        .await
        .unwrap();
    let item = create(&store, "durable", "write").await;
    store.close().await;

    let reopened = SqliteStore::connect_with(SqliteConnectOptions::new().filename(&path), 1)
        .await
        .unwrap();
    assert_eq!(reopened.find_by_id(item.id).await.unwrap(), Some(item));
}

#[tokio::test]
async fn sqlite_unknown_status_is_corrupt() {
    let (store, _dir) = sqlite_store().await;
    let item = create(&store, "a", "b").await;

    sqlx::query("UPDATE todo_items SET status = 9 WHERE id = ?")
        .bind(item.id)
        .execute(&store.pool)
        .await
        .unwrap();

    let err = store.find_by_id(item.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }));
}
