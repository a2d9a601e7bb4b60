use obox_persist::{PersistClient, Theme};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::error::Result;
use crate::types::PendingAction;

#[derive(Debug)]
struct ContextState {
    theme: Theme,
    sidebar_open: bool,
    pending: Option<PendingAction>,
    search_enabled: bool,
    reason_enabled: bool,
    search_id: Option<String>,
    source_panel_open: bool,
    generating: bool,
}

/// Process-wide UI state shared by the host and the chat session
///
/// Clones share one state. Only the theme is persisted.
#[derive(Clone)]
pub struct AppContext {
    state: Arc<RwLock<ContextState>>,
    persist: PersistClient,
}

impl AppContext {
    /// Build from persisted preferences
    pub fn new(persist: PersistClient) -> Self {
        let theme = persist.preferences().theme();
        Self {
            state: Arc::new(RwLock::new(ContextState {
                theme,
                sidebar_open: true,
                pending: None,
                search_enabled: true,
                reason_enabled: true,
                search_id: None,
                source_panel_open: false,
                generating: false,
            })),
            persist,
        }
    }

    // A panic while holding the lock cannot leave these plain fields half-written
    fn read(&self) -> RwLockReadGuard<'_, ContextState> {
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ContextState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn theme(&self) -> Theme {
        self.read().theme
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.persist.preferences().set_theme(theme)?;
        self.write().theme = theme;
        Ok(())
    }

    pub fn sidebar_open(&self) -> bool {
        self.read().sidebar_open
    }

    /// Returns the new state
    pub fn toggle_sidebar(&self) -> bool {
        let mut state = self.write();
        state.sidebar_open = !state.sidebar_open;
        state.sidebar_open
    }

    pub fn pending(&self) -> Option<PendingAction> {
        self.read().pending.clone()
    }

    pub fn set_pending(&self, pending: Option<PendingAction>) {
        self.write().pending = pending;
    }

    pub fn take_pending(&self) -> Option<PendingAction> {
        self.write().pending.take()
    }

    pub fn search_enabled(&self) -> bool {
        self.read().search_enabled
    }

    pub fn set_search_enabled(&self, enabled: bool) {
        self.write().search_enabled = enabled;
    }

    pub fn reason_enabled(&self) -> bool {
        self.read().reason_enabled
    }

    pub fn set_reason_enabled(&self, enabled: bool) {
        self.write().reason_enabled = enabled;
    }

    pub fn search_id(&self) -> Option<String> {
        self.read().search_id.clone()
    }

    pub fn set_search_id(&self, search_id: Option<String>) {
        self.write().search_id = search_id;
    }

    pub fn source_panel_open(&self) -> bool {
        self.read().source_panel_open
    }

    /// Open the source panel on `search_id`, or close it if it already shows that set
    ///
    /// Returns whether the panel is open afterwards.
    pub fn toggle_sources(&self, search_id: &str) -> bool {
        let mut state = self.write();
        if state.source_panel_open && state.search_id.as_deref() == Some(search_id) {
            state.source_panel_open = false;
            state.search_id = None;
            debug!("Closed source panel");
            return false;
        }
        state.source_panel_open = true;
        state.search_id = Some(search_id.to_string());
        debug!("Showing sources {}", search_id);
        true
    }

    pub fn close_sources(&self) {
        let mut state = self.write();
        state.source_panel_open = false;
        state.search_id = None;
    }

    pub fn is_generating(&self) -> bool {
        self.read().generating
    }

    /// Claim the single generation slot; false if already taken
    pub fn try_begin_generation(&self) -> bool {
        let mut state = self.write();
        if state.generating {
            return false;
        }
        state.generating = true;
        true
    }

    pub fn end_generation(&self) {
        self.write().generating = false;
    }
}
