//! Server-side components of the `todoit` service.
//!
//! ## Submodules
//!
//! - [`config`] - Command line / environment configuration.
//! - [`service`] - The `ToDoIt` gRPC service and its request validation.
//! - [`telemetry`] - Logging and optional OpenTelemetry export.

pub mod config;
pub mod service;
pub mod telemetry;
