//! # The to-do entity
//!
//! [`ToDoItem`] is the record a store persists. It is deliberately separate
//! from the generated protobuf messages: stores speak entities, the service
//! maps them onto wire shapes with the `From` impls below.
//!
//! The item `status` reuses the generated [`ToDoStatus`] enum so the stored
//! values are exactly the ones defined by the wire contract. Its zero value
//! (`NotStarted`) is what Create assigns.

use crate::proto::{ReadToDoResponse, ToDoStatus as ProtoStatus};

/// Store-assigned identity of an item. Always positive once assigned.
pub type ToDoId = i64;

/// Completion state of an item, as defined by `proto/todoit.proto`.
pub type ToDoStatus = ProtoStatus;

/// A persisted to-do item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToDoItem {
    pub id: ToDoId,
    pub title: String,
    pub description: String,
    pub status: ToDoStatus,
}

/// An item that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewToDoItem {
    pub title: String,
    pub description: String,
    pub status: ToDoStatus,
}

impl NewToDoItem {
    /// A fresh item in the default (`NotStarted`) state.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: ToDoStatus::default(),
        }
    }

    /// Attaches the id handed out by the store.
    pub fn with_id(self, id: ToDoId) -> ToDoItem {
        ToDoItem {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
        }
    }
}

impl From<ToDoItem> for ReadToDoResponse {
    fn from(item: ToDoItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            status: item.status.into(),
        }
    }
}

/// Converts a raw status value (from the wire or a database column).
///
/// Returns `None` for values the enum does not define.
pub fn status_from_raw(raw: i32) -> Option<ToDoStatus> {
    ToDoStatus::try_from(raw).ok()
}
