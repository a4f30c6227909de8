//! bookhaven-core - catalog client, state stores and persistence
//!
//! Fetches a reading list and work details from Open Library, tracks each
//! fetch in a store, and keeps the user's saved books in a durable
//! key-value slot.

pub mod catalog;
pub mod config;
pub mod kv_store;
pub mod open_library;
pub mod service;
pub mod stores;

pub use catalog::{CatalogDetail, CatalogItem};
pub use config::Config;
pub use kv_store::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use open_library::{CatalogError, CatalogSource, OpenLibraryClient};
pub use service::CatalogService;
