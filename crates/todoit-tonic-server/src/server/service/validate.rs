//! Structural request validation.
//!
//! Every check here runs before any store access, so a rejected request has
//! no side effects.

use todoit_core::{
    Error, Result,
    types::{ToDoId, ToDoStatus, status_from_raw},
};

/// Ids are assigned by the store starting at 1.
pub fn require_id(id: ToDoId) -> Result<ToDoId> {
    if id <= 0 {
        return Err(Error::invalid(format!(
            "Id must be a positive integer, got {id}"
        )));
    }
    Ok(id)
}

/// Title and description are both required.
pub fn require_content(title: &str, description: &str) -> Result<()> {
    match (title.is_empty(), description.is_empty()) {
        (false, false) => Ok(()),
        (true, false) => Err(Error::invalid("Title must not be empty")),
        (false, true) => Err(Error::invalid("Description must not be empty")),
        (true, true) => Err(Error::invalid("Title and description must not be empty")),
    }
}

/// Rejects raw enum values the contract does not define.
pub fn require_status(raw: i32) -> Result<ToDoStatus> {
    status_from_raw(raw).ok_or_else(|| Error::invalid(format!("Unknown status value {raw}")))
}
