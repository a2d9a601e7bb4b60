use std::sync::Arc;
use tracing::warn;

use crate::dbs::keys;
use crate::error::Result;
use crate::models::Theme;
use crate::trait_client::KeyValueStore;

/// UI preferences; the theme is stored as its bare name
#[derive(Clone)]
pub struct PreferencesRepository {
    store: Arc<dyn KeyValueStore>,
}

impl PreferencesRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored theme; absent or unreadable values fall back to `auto`
    pub fn theme(&self) -> Theme {
        match self.store.get(keys::THEME) {
            Ok(Some(raw)) => raw.parse().unwrap_or_else(|e| {
                warn!("Ignoring stored theme: {}", e);
                Theme::default()
            }),
            Ok(None) => Theme::default(),
            Err(e) => {
                warn!("Failed to read theme preference: {}", e);
                Theme::default()
            }
        }
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(keys::THEME, theme.as_str().to_string())
    }
}
