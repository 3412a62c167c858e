//! Definitions shared by the `todoit` server, stores and clients.
//!
//! ## Submodules
//!
//! - [`error`] - Service error taxonomy and its `tonic::Status` mapping.
//! - [`types`] - The persisted to-do entity and its wire conversions.
//! - [`proto`] - Generated protobuf messages, service traits and clients.

pub mod error;
pub mod types;

pub use error::{Error, Result, StoreError};

/// gRPC service and message definitions generated from `proto/todoit.proto`.
///
/// ## Service
///
/// - `ToDoIt` - create/read/list/update/delete over a single to-do entity.
///
/// ## Status codes
///
/// - `INVALID_ARGUMENT` - a required string is empty, the id is not
///   positive, or the status is not a known `ToDoStatus`.
/// - `NOT_FOUND` - no item exists with the requested id.
pub mod proto {
    tonic::include_proto!("todoit");
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("todoit_descriptor");
}
