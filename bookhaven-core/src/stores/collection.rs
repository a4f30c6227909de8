//! Persisted collection of saved books
//!
//! The whole map is written back to its storage slot after every mutation.
//! Storage failures never reach the caller: a bad read starts an empty
//! collection, a failed write is logged and the in-memory map stays
//! authoritative for the session.

use crate::catalog::{extract_year, CatalogItem};
use crate::kv_store::KeyValueStore;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Storage slot holding the serialized collection.
pub const COLLECTION_KEY: &str = "book-collection";

/// Saved books keyed by id. Membership is the "saved" predicate.
pub struct CollectionStore {
    items: BTreeMap<String, CatalogItem>,
    storage: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl CollectionStore {
    /// Load the collection from `storage`.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let items = storage
            .get(COLLECTION_KEY)
            .map(|raw| decode_collection(&raw))
            .unwrap_or_default();
        debug!("Loaded {} saved books", items.len());
        Self { items, storage }
    }

    /// Save the item if absent, remove it if present. Returns whether the
    /// item is saved afterwards.
    pub fn toggle(&mut self, item: CatalogItem) -> bool {
        let saved = if self.items.remove(&item.id).is_some() {
            false
        } else {
            self.items.insert(item.id.clone(), item);
            true
        };
        self.persist();
        saved
    }

    /// Insert or replace the item under its id.
    pub fn add(&mut self, item: CatalogItem) {
        self.items.insert(item.id.clone(), item);
        self.persist();
    }

    /// Remove by id. Returns the removed item, if it was saved.
    pub fn remove(&mut self, id: &str) -> Option<CatalogItem> {
        let removed = self.items.remove(id);
        self.persist();
        removed
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.persist();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.items.get(id)
    }

    /// Saved items in id order.
    pub fn items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.values()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.items) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize collection: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(COLLECTION_KEY, &json) {
            warn!("Failed to persist collection: {}", e);
        }
    }
}

/// Decode a stored collection, backfilling `year` on legacy entries.
///
/// Anything unreadable yields an empty map; single entries that do not
/// decode are skipped.
fn decode_collection(raw: &str) -> BTreeMap<String, CatalogItem> {
    if raw.trim().is_empty() {
        return BTreeMap::new();
    }
    let entries = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(entries)) => entries,
        Ok(_) => {
            warn!("Stored collection is not a JSON object, starting empty");
            return BTreeMap::new();
        }
        Err(e) => {
            warn!("Stored collection is malformed, starting empty: {}", e);
            return BTreeMap::new();
        }
    };

    entries
        .into_iter()
        .filter_map(|(id, value)| match serde_json::from_value::<CatalogItem>(value) {
            Ok(mut item) => {
                if item.year.is_none() {
                    item.year = item.logged_at.as_deref().and_then(extract_year);
                }
                Some((id, item))
            }
            Err(e) => {
                warn!("Skipping unreadable saved book {}: {}", id, e);
                None
            }
        })
        .collect()
}
