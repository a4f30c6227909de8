//! Single-slot notification with auto-dismiss
//!
//! At most one message is live. Showing a new one overwrites the old one and
//! restarts the dismiss timer; there is no queue.

use bookhaven_common::NotificationKind;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// How long a notification stays visible.
pub const NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

/// What the view renders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Notification {
    /// Kept after hiding so a fade-out can still show it
    pub message: Option<String>,
    pub kind: NotificationKind,
    pub visible: bool,
}

#[derive(Default)]
struct Inner {
    current: Notification,
    /// Bumped by every show/hide/clear. A timer only hides the notification
    /// it was scheduled for.
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

impl Inner {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Notification state plus its one live dismiss timer.
///
/// Timers run on the ambient tokio runtime. Dropping the store cancels any
/// pending timer.
pub struct NotificationStore {
    inner: Arc<Mutex<Inner>>,
    duration: Duration,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        Self::with_duration(NOTIFICATION_DURATION)
    }

    pub fn with_duration(duration: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            duration,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }

    /// Replace the current notification and schedule its dismissal.
    pub fn show(&self, message: impl Into<String>, kind: NotificationKind) {
        let message = message.into();
        debug!("Notification ({}): {}", kind, message);

        let mut inner = self.lock();
        inner.cancel_timer();
        inner.generation += 1;
        inner.current = Notification {
            message: Some(message),
            kind,
            visible: true,
        };
        inner.timer = self.schedule_dismiss(inner.generation);
    }

    /// Hide without forgetting the message.
    pub fn hide(&self) {
        let mut inner = self.lock();
        inner.cancel_timer();
        inner.generation += 1;
        inner.current.visible = false;
    }

    /// Hide and forget the message.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.cancel_timer();
        inner.generation += 1;
        inner.current.message = None;
        inner.current.visible = false;
    }

    pub fn snapshot(&self) -> Notification {
        self.lock().current.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.lock().current.visible
    }

    fn schedule_dismiss(&self, generation: u64) -> Option<JoinHandle<()>> {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("No async runtime, notification will not auto-dismiss");
            return None;
        };
        let inner = Arc::downgrade(&self.inner);
        let duration = self.duration;
        Some(handle.spawn(async move {
            tokio::time::sleep(duration).await;
            dismiss_if_current(&inner, generation);
        }))
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|e| e.into_inner())
}

fn dismiss_if_current(inner: &Weak<Mutex<Inner>>, generation: u64) {
    let Some(inner) = inner.upgrade() else {
        return;
    };
    let mut inner = lock_inner(&inner);
    if inner.generation != generation {
        return;
    }
    inner.current.visible = false;
    inner.timer = None;
}

impl Drop for NotificationStore {
    fn drop(&mut self) {
        self.lock().cancel_timer();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    #[tokio::test(start_paused = true)]
    async fn test_auto_dismiss_after_duration() {
        let store = NotificationStore::new();
        store.show("Added to collection", NotificationKind::Success);
        assert!(store.is_visible());

        sleep(Duration::from_millis(2_999)).await;
        assert!(store.is_visible());

        sleep(Duration::from_millis(2)).await;
        let snapshot = store.snapshot();
        assert!(!snapshot.visible);
        assert_eq!(snapshot.message.as_deref(), Some("Added to collection"));
        assert_eq!(snapshot.kind, NotificationKind::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_show_resets_timer() {
        let store = NotificationStore::new();
        store.show("first", NotificationKind::Info);
        sleep(Duration::from_secs(2)).await;
        store.show("second", NotificationKind::Warning);

        // Past the first message's deadline but not the second's
        sleep(Duration::from_secs(2)).await;
        let snapshot = store.snapshot();
        assert!(snapshot.visible);
        assert_eq!(snapshot.message.as_deref(), Some("second"));

        sleep(Duration::from_millis(1_100)).await;
        assert!(!store.is_visible());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hide_keeps_message_and_cancels_timer() {
        let store = NotificationStore::new();
        store.show("Removed from collection", NotificationKind::Info);
        store.hide();
        let snapshot = store.snapshot();
        assert!(!snapshot.visible);
        assert_eq!(snapshot.message.as_deref(), Some("Removed from collection"));
        assert!(store.lock().timer.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_forgets_message() {
        let store = NotificationStore::new();
        store.show("Collection cleared", NotificationKind::Info);
        store.clear();
        assert_eq!(store.snapshot(), Notification::default());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let store = NotificationStore::new();
        store.show("bye", NotificationKind::Info);
        let inner = Arc::downgrade(&store.inner);
        drop(store);
        sleep(NOTIFICATION_DURATION * 2).await;
        assert!(inner.upgrade().is_none());
    }

    #[test]
    fn test_show_without_runtime_stays_visible() {
        let store = NotificationStore::new();
        store.show("no runtime", NotificationKind::Info);
        assert!(store.is_visible());
    }

    #[test]
    fn test_default_kind_is_info() {
        assert_eq!(Notification::default().kind, NotificationKind::Info);
    }
}
