//! Error types for the to-do service.
//!
//! [`Error`] captures the outcomes a caller can observe and implements
//! `From<Error>` for `tonic::Status` so handlers can return it with `?`.
//!
//! ## Error Cases
//! - `InvalidRequest`: The request failed validation before touching the
//!   store. Maps to `INVALID_ARGUMENT`.
//! - `NotFound`: A well-formed id has no stored item. Maps to `NOT_FOUND`.
//! - `Store`: The store failed. These are not classified any further and
//!   surface as `UNKNOWN`.

use crate::types::ToDoId;
use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the to-do service.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The request was malformed (empty required field, non-positive id,
    /// unknown status).
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// No item is stored under the requested id.
    #[error("Requested todo item not found, Todo id {id}")]
    NotFound { id: ToDoId },

    /// The backing store failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl Error {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }
}

/// Failures raised by a store implementation.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The storage backend (database driver, connection pool, ...) failed.
    #[error("backend failure: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A stored row could not be mapped onto a `ToDoItem`.
    #[error("corrupt row: {reason}")]
    Corrupt { reason: String },

    /// A write targeted an item that is no longer stored.
    ///
    /// Guard at the store boundary. The service reads an item inside the same
    /// transaction before writing it, so it does not hit this path itself.
    #[error("item {id} no longer exists")]
    Stale { id: ToDoId },
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::InvalidRequest { reason } => Status::invalid_argument(reason),
            e @ Error::NotFound { .. } => Status::not_found(e.to_string()),
            Error::Store(e) => Status::unknown(e.to_string()),
        }
    }
}
