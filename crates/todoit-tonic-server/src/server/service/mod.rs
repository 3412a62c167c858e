//! The `ToDoIt` gRPC service.
//!
//! ## Structure
//!
//! - [`handler`] - gRPC service entry point (`ToDoService`).
//! - [`validate`] - Request checks performed before the store is touched.

pub mod handler;
pub mod validate;
