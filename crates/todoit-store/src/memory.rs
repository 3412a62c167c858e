//! In-process store.
//!
//! Items live in a `BTreeMap` keyed by id, so listing returns them in
//! ascending id order. A transaction owns the mutex guard for its whole
//! lifetime, which serializes writers the same way SQLite's writer lock
//! does. Writes are staged in an overlay and only applied on `persist`.

use crate::interface::{Store, StoreResult, StoreTx};
use std::collections::BTreeMap;
use std::sync::Arc;
use todoit_core::{
    StoreError,
    types::{NewToDoItem, ToDoId, ToDoItem},
};
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
struct State {
    items: BTreeMap<ToDoId, ToDoItem>,
    /// Highest id ever handed out. Never rewound.
    last_id: ToDoId,
}

/// A [`Store`] that keeps everything in memory.
///
/// Cloning is cheap and every clone sees the same items.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Store for MemoryStore {
    type Tx = MemoryTx;

    async fn begin(&self) -> StoreResult<MemoryTx> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        Ok(MemoryTx {
            guard,
            staged: BTreeMap::new(),
        })
    }

    async fn find_by_id(&self, id: ToDoId) -> StoreResult<Option<ToDoItem>> {
        Ok(self.state.lock().await.items.get(&id).cloned())
    }

    async fn list_all(&self) -> StoreResult<Vec<ToDoItem>> {
        Ok(self.state.lock().await.items.values().cloned().collect())
    }
}

/// Transaction over a [`MemoryStore`].
///
/// `staged` maps an id to its pending value: `Some` for an insert or
/// overwrite, `None` for a removal.
#[derive(Debug)]
pub struct MemoryTx {
    guard: OwnedMutexGuard<State>,
    staged: BTreeMap<ToDoId, Option<ToDoItem>>,
}

impl MemoryTx {
    fn visible(&self, id: ToDoId) -> Option<&ToDoItem> {
        match self.staged.get(&id) {
            Some(pending) => pending.as_ref(),
            None => self.guard.items.get(&id),
        }
    }

    fn ensure_visible(&self, id: ToDoId) -> StoreResult<()> {
        match self.visible(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::Stale { id }),
        }
    }
}

impl StoreTx for MemoryTx {
    async fn find_by_id(&mut self, id: ToDoId) -> StoreResult<Option<ToDoItem>> {
        Ok(self.visible(id).cloned())
    }

    async fn insert(&mut self, item: NewToDoItem) -> StoreResult<ToDoItem> {
        self.guard.last_id += 1;
        let item = item.with_id(self.guard.last_id);
        self.staged.insert(item.id, Some(item.clone()));
        Ok(item)
    }

    async fn update(&mut self, item: &ToDoItem) -> StoreResult<()> {
        self.ensure_visible(item.id)?;
        self.staged.insert(item.id, Some(item.clone()));
        Ok(())
    }

    async fn remove(&mut self, item: &ToDoItem) -> StoreResult<()> {
        self.ensure_visible(item.id)?;
        self.staged.insert(item.id, None);
        Ok(())
    }

    async fn persist(mut self) -> StoreResult<()> {
        for (id, pending) in core::mem::take(&mut self.staged) {
            match pending {
                Some(item) => {
                    self.guard.items.insert(id, item);
                }
                None => {
                    self.guard.items.remove(&id);
                }
            }
        }
        Ok(())
    }
}
