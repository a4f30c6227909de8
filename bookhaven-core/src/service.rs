//! CatalogService - runs fetch lifecycles against the stores
//!
//! Front ends call the action methods here instead of driving store
//! transitions themselves. Store locks are only held for the synchronous
//! transition, never across a network await, so the list fetch and any
//! number of detail fetches can be in flight at once.

use crate::catalog::{self, CatalogDetail, CatalogItem};
use crate::kv_store::KeyValueStore;
use crate::open_library::CatalogSource;
use crate::stores::{
    BookDetailStore, BookListStore, CollectionStore, Notification, NotificationStore,
};
use bookhaven_common::{FetchState, FetchStatus, NotificationKind, SortDirection};
use futures::future::join_all;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

pub const SAVED_MESSAGE: &str = "Added to collection";
pub const REMOVED_MESSAGE: &str = "Removed from collection";
pub const CLEARED_MESSAGE: &str = "Collection cleared";
/// Failure recorded when a fetch's future is dropped before it completes.
pub const CANCELLED_MESSAGE: &str = "Request cancelled";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Runs `on_cancel` on drop unless disarmed. Held across a fetch's await so
/// a dropped future still moves its store out of `Loading`.
struct CancelGuard<F: FnOnce()> {
    on_cancel: Option<F>,
}

impl<F: FnOnce()> CancelGuard<F> {
    fn new(on_cancel: F) -> Self {
        Self {
            on_cancel: Some(on_cancel),
        }
    }

    fn disarm(mut self) {
        self.on_cancel = None;
    }
}

impl<F: FnOnce()> Drop for CancelGuard<F> {
    fn drop(&mut self) {
        if let Some(on_cancel) = self.on_cancel.take() {
            on_cancel();
        }
    }
}

pub struct CatalogService {
    source: Arc<dyn CatalogSource>,
    book_list: Mutex<BookListStore>,
    book_detail: Mutex<BookDetailStore>,
    collection: Mutex<CollectionStore>,
    notifications: NotificationStore,
}

impl CatalogService {
    /// Create the service. The collection is loaded from `storage` now.
    pub fn new(source: Arc<dyn CatalogSource>, storage: Arc<dyn KeyValueStore>) -> Self {
        Self::with_notifications(source, storage, NotificationStore::new())
    }

    pub fn with_notifications(
        source: Arc<dyn CatalogSource>,
        storage: Arc<dyn KeyValueStore>,
        notifications: NotificationStore,
    ) -> Self {
        Self {
            source,
            book_list: Mutex::new(BookListStore::new()),
            book_detail: Mutex::new(BookDetailStore::new()),
            collection: Mutex::new(CollectionStore::load(storage)),
            notifications,
        }
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch the reading list. If a fetch is already running this returns
    /// the current `Loading` state without sending another request.
    pub async fn refresh_list(&self) -> FetchState {
        if !lock(&self.book_list).request_fetch() {
            info!("Reading list fetch already in flight");
            return FetchState::Loading;
        }

        let guard = CancelGuard::new(|| {
            warn!("Reading list fetch cancelled");
            lock(&self.book_list).on_failure(CANCELLED_MESSAGE);
        });
        let result = self.source.fetch_catalog_list().await;
        guard.disarm();

        let mut store = lock(&self.book_list);
        match result {
            Ok(items) => {
                store.on_success(items);
            }
            Err(e) => {
                warn!("Reading list fetch failed: {}", e);
                store.on_failure(e.to_string());
            }
        }
        store.state().clone()
    }

    /// Fetch one work's detail, tracked under `id`.
    pub async fn load_detail(&self, id: &str) -> FetchState {
        if !lock(&self.book_detail).request_fetch(id) {
            info!("Detail fetch for {} already in flight", id);
            return FetchState::Loading;
        }

        let guard = CancelGuard::new(|| {
            warn!("Detail fetch for {} cancelled", id);
            lock(&self.book_detail).on_failure(id, CANCELLED_MESSAGE);
        });
        let result = self.source.fetch_catalog_detail(id).await;
        guard.disarm();

        let mut store = lock(&self.book_detail);
        match result {
            Ok(detail) => {
                store.on_success(id, detail);
            }
            Err(e) => {
                warn!("Detail fetch for {} failed: {}", id, e);
                store.on_failure(id, e.to_string());
            }
        }
        store.state(id)
    }

    /// Fetch several details concurrently. States come back in input order.
    pub async fn load_details(&self, ids: &[String]) -> Vec<FetchState> {
        join_all(ids.iter().map(|id| self.load_detail(id))).await
    }

    // =========================================================================
    // Collection
    // =========================================================================

    /// Save or un-save a book and announce the result. Returns whether the
    /// book is saved afterwards.
    pub fn toggle_saved(&self, item: CatalogItem) -> bool {
        let saved = lock(&self.collection).toggle(item);
        if saved {
            self.notifications.show(SAVED_MESSAGE, NotificationKind::Success);
        } else {
            self.notifications.show(REMOVED_MESSAGE, NotificationKind::Warning);
        }
        saved
    }

    /// Toggle a book known only by id. A saved book is un-saved. Otherwise
    /// the book is taken from the reading list, fetching it if it has not
    /// loaded yet, and then from the work's detail record. Returns `None`
    /// when neither source has the book.
    pub async fn toggle_saved_by_id(&self, id: &str) -> Option<bool> {
        let saved = lock(&self.collection).get(id).cloned();
        if let Some(saved) = saved {
            return Some(self.toggle_saved(saved));
        }

        if lock(&self.book_list).status() != FetchStatus::Succeeded {
            self.refresh_list().await;
        }
        if let Some(item) = self.list_item(id) {
            return Some(self.toggle_saved(item));
        }

        if self.detail(id).is_none() {
            self.load_detail(id).await;
        }
        let detail = self.detail(id)?;
        info!("Saving {} from its detail record", id);
        Some(self.toggle_saved(CatalogItem::from(&detail)))
    }

    /// Un-save a book by id. Returns the removed entry, if it was saved.
    pub fn remove_saved(&self, id: &str) -> Option<CatalogItem> {
        let removed = lock(&self.collection).remove(id);
        if removed.is_some() {
            self.notifications.show(REMOVED_MESSAGE, NotificationKind::Warning);
        }
        removed
    }

    pub fn clear_collection(&self) {
        lock(&self.collection).clear();
        self.notifications.show(CLEARED_MESSAGE, NotificationKind::Info);
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn book_list(&self) -> BookListStore {
        lock(&self.book_list).clone()
    }

    /// The last fetched reading list, sorted by year.
    pub fn sorted_list(&self, direction: SortDirection) -> Vec<CatalogItem> {
        let mut items = lock(&self.book_list).items().to_vec();
        catalog::sort_by_year(&mut items, direction);
        items
    }

    /// A reading-list item by id, from the last successful fetch.
    pub fn list_item(&self, id: &str) -> Option<CatalogItem> {
        lock(&self.book_list).find(id).cloned()
    }

    pub fn detail_state(&self, id: &str) -> FetchState {
        lock(&self.book_detail).state(id)
    }

    pub fn detail(&self, id: &str) -> Option<CatalogDetail> {
        lock(&self.book_detail).detail(id).cloned()
    }

    pub fn is_saved(&self, id: &str) -> bool {
        lock(&self.collection).contains(id)
    }

    pub fn saved_items(&self) -> Vec<CatalogItem> {
        lock(&self.collection).items().cloned().collect()
    }

    pub fn notification(&self) -> Notification {
        self.notifications.snapshot()
    }
}
