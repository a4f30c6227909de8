//! Reading list fetch-state store

use crate::catalog::CatalogItem;
use bookhaven_common::{FetchState, FetchStatus};
use tracing::warn;

/// State for the reading list view
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookListStore {
    /// Items from the last successful fetch. Kept through later failures.
    items: Vec<CatalogItem>,
    state: FetchState,
}

impl BookListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch. Returns `false` if one is already outstanding.
    pub fn request_fetch(&mut self) -> bool {
        self.state.begin()
    }

    /// Store the fetched items. Ignored unless a fetch is outstanding.
    pub fn on_success(&mut self, items: Vec<CatalogItem>) -> bool {
        if !self.state.succeed() {
            warn!("Reading list result arrived with no fetch outstanding, ignoring");
            return false;
        }
        self.items = items;
        true
    }

    /// Record a failure, leaving previously fetched items readable.
    pub fn on_failure(&mut self, message: impl Into<String>) -> bool {
        if !self.state.fail(message) {
            warn!("Reading list failure arrived with no fetch outstanding, ignoring");
            return false;
        }
        true
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn status(&self) -> FetchStatus {
        self.state.status()
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error()
    }

    /// Look up an item from the current list by id.
    pub fn find(&self, id: &str) -> Option<&CatalogItem> {
        self.items.iter().find(|item| item.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> CatalogItem {
        CatalogItem {
            id: id.to_string(),
            title: format!("Title {id}"),
            image_url: format!("https://covers.example/{id}-L.jpg"),
            year: None,
            authors: Vec::new(),
            rating: None,
            logged_at: None,
        }
    }

    #[test]
    fn test_starts_idle_and_empty() {
        let store = BookListStore::new();
        assert_eq!(store.status(), FetchStatus::Idle);
        assert_eq!(store.error(), None);
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_success_stores_items() {
        let mut store = BookListStore::new();
        assert!(store.request_fetch());
        assert_eq!(store.status(), FetchStatus::Loading);
        assert!(store.on_success(vec![item("OL1W"), item("OL2W")]));
        assert_eq!(store.status(), FetchStatus::Succeeded);
        assert_eq!(store.items().len(), 2);
        assert_eq!(store.find("OL2W").map(|i| i.title.as_str()), Some("Title OL2W"));
    }

    #[test]
    fn test_duplicate_request_while_loading_is_refused() {
        let mut store = BookListStore::new();
        assert!(store.request_fetch());
        assert!(!store.request_fetch());
        assert_eq!(store.status(), FetchStatus::Loading);
    }

    #[test]
    fn test_failure_keeps_stale_items() {
        let mut store = BookListStore::new();
        store.request_fetch();
        store.on_success(vec![item("OL1W")]);

        assert!(store.request_fetch());
        assert_eq!(store.error(), None);
        assert!(store.on_failure("Network Error"));
        assert_eq!(store.status(), FetchStatus::Failed);
        assert_eq!(store.error(), Some("Network Error"));
        assert_eq!(store.items(), &[item("OL1W")]);
    }

    #[test]
    fn test_refetch_replaces_items_wholesale() {
        let mut store = BookListStore::new();
        store.request_fetch();
        store.on_success(vec![item("OL1W"), item("OL2W")]);
        store.request_fetch();
        store.on_success(vec![item("OL3W")]);
        assert_eq!(store.items(), &[item("OL3W")]);
    }

    #[test]
    fn test_results_without_outstanding_fetch_are_ignored() {
        let mut store = BookListStore::new();
        assert!(!store.on_success(vec![item("OL1W")]));
        assert!(!store.on_failure("late"));
        assert_eq!(store, BookListStore::new());
    }
}
