//! Per-work detail fetch-state store

use crate::catalog::CatalogDetail;
use bookhaven_common::{FetchState, FetchStatus};
use std::collections::HashMap;
use tracing::warn;

/// Detail records and their fetch state, keyed by work id.
///
/// Every operation touches only the slot of the id it was given, so
/// fetches for different ids can complete in any order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookDetailStore {
    entities: HashMap<String, CatalogDetail>,
    states: HashMap<String, FetchState>,
}

impl BookDetailStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch for `id`. Returns `false` if one is already outstanding
    /// for that id.
    pub fn request_fetch(&mut self, id: &str) -> bool {
        self.states.entry(id.to_string()).or_default().begin()
    }

    /// Store the fetched detail under the requested id.
    pub fn on_success(&mut self, id: &str, detail: CatalogDetail) -> bool {
        let accepted = self
            .states
            .get_mut(id)
            .map(|state| state.succeed())
            .unwrap_or(false);
        if !accepted {
            warn!("Detail for {} arrived with no fetch outstanding, ignoring", id);
            return false;
        }
        self.entities.insert(id.to_string(), detail);
        true
    }

    /// Record a failure for `id`. Any detail stored earlier stays readable.
    pub fn on_failure(&mut self, id: &str, message: impl Into<String>) -> bool {
        let accepted = self
            .states
            .get_mut(id)
            .map(|state| state.fail(message))
            .unwrap_or(false);
        if !accepted {
            warn!("Detail failure for {} arrived with no fetch outstanding, ignoring", id);
        }
        accepted
    }

    /// Fetch state for `id`. Ids never requested are `Idle`.
    pub fn state(&self, id: &str) -> FetchState {
        self.states.get(id).cloned().unwrap_or_default()
    }

    pub fn status(&self, id: &str) -> FetchStatus {
        self.states
            .get(id)
            .map(FetchState::status)
            .unwrap_or(FetchStatus::Idle)
    }

    pub fn error(&self, id: &str) -> Option<&str> {
        self.states.get(id).and_then(FetchState::error)
    }

    pub fn detail(&self, id: &str) -> Option<&CatalogDetail> {
        self.entities.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(id: &str) -> CatalogDetail {
        CatalogDetail {
            id: id.to_string(),
            title: format!("Title {id}"),
            image_url: "https://covers.example/1-L.jpg".to_string(),
            description: None,
            subjects: vec!["Fiction".to_string()],
            first_publish_year: Some(1965),
        }
    }

    #[test]
    fn test_unseen_id_is_idle() {
        let store = BookDetailStore::new();
        assert_eq!(store.status("OL404W"), FetchStatus::Idle);
        assert_eq!(store.state("OL404W"), FetchState::Idle);
        assert_eq!(store.error("OL404W"), None);
        assert_eq!(store.detail("OL404W"), None);
    }

    #[test]
    fn test_success_for_one_id_leaves_others_idle() {
        let mut store = BookDetailStore::new();
        assert!(store.request_fetch("A"));
        assert!(store.on_success("A", detail("A")));
        assert_eq!(store.status("A"), FetchStatus::Succeeded);
        assert_eq!(store.status("B"), FetchStatus::Idle);
        assert_eq!(store.detail("B"), None);
    }

    #[test]
    fn test_interleaved_completions_stay_separate() {
        let mut store = BookDetailStore::new();
        store.request_fetch("A");
        store.request_fetch("B");
        assert!(store.on_failure("B", "Request failed with status code 404"));
        assert_eq!(store.status("A"), FetchStatus::Loading);
        assert!(store.on_success("A", detail("A")));

        assert_eq!(store.status("A"), FetchStatus::Succeeded);
        assert_eq!(store.error("A"), None);
        assert_eq!(store.status("B"), FetchStatus::Failed);
        assert_eq!(store.error("B"), Some("Request failed with status code 404"));
    }

    #[test]
    fn test_duplicate_request_for_same_id_is_refused() {
        let mut store = BookDetailStore::new();
        assert!(store.request_fetch("A"));
        assert!(!store.request_fetch("A"));
        assert!(store.request_fetch("B"));
    }

    #[test]
    fn test_failed_refetch_keeps_previous_detail() {
        let mut store = BookDetailStore::new();
        store.request_fetch("A");
        store.on_success("A", detail("A"));
        store.request_fetch("A");
        store.on_failure("A", "timeout");
        assert_eq!(store.detail("A"), Some(&detail("A")));
        assert_eq!(store.error("A"), Some("timeout"));
    }

    #[test]
    fn test_result_for_unrequested_id_is_ignored() {
        let mut store = BookDetailStore::new();
        assert!(!store.on_success("A", detail("A")));
        assert!(!store.on_failure("A", "late"));
        assert_eq!(store.detail("A"), None);
        assert_eq!(store.status("A"), FetchStatus::Idle);
    }
}
