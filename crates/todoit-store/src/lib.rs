#![doc = include_str!("../README.md")]

mod interface;
mod memory;
mod sqlite;
#[cfg(test)]
mod tests;

pub use interface::{Store, StoreResult, StoreTx};
pub use memory::{MemoryStore, MemoryTx};
pub use sqlite::{SqliteStore, SqliteTx};
pub use todoit_core::StoreError;
