//! Storage module
//!
//! Provides the durable key-value store behind the habit list snapshot.

pub mod kv_store;

pub use kv_store::{FileStore, KeyValueStore, MemoryStore};
