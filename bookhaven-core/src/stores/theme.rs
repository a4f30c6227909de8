//! Persisted theme preference

use crate::kv_store::KeyValueStore;
use bookhaven_common::ThemeMode;
use std::sync::Arc;
use tracing::warn;

/// Storage slot holding `"light"` or `"dark"`.
pub const THEME_KEY: &str = "bookhaven-theme-mode";

pub struct ThemePreference {
    mode: ThemeMode,
    storage: Arc<dyn KeyValueStore>,
}

impl ThemePreference {
    /// Read the stored mode. Missing or unrecognized values fall back to dark.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let mode = storage
            .get(THEME_KEY)
            .and_then(|raw| raw.parse::<ThemeMode>().ok())
            .unwrap_or_default();
        Self { mode, storage }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn set(&mut self, mode: ThemeMode) {
        self.mode = mode;
        if let Err(e) = self.storage.set(THEME_KEY, mode.as_str()) {
            warn!("Failed to persist theme preference: {}", e);
        }
    }

    /// Flip between light and dark and persist. Returns the new mode.
    pub fn toggle(&mut self) -> ThemeMode {
        let mode = self.mode.toggled();
        self.set(mode);
        mode
    }
}
