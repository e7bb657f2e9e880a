//! The host can't query the browser for tabs, so it keeps its own view of them, built from the
//! tab and focus events the extension forwards.

use std::collections::HashMap;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

pub type TabId = i64;
pub type WindowId = i64;

/// Window id the browser reports when none of its windows has focus.
pub const WINDOW_ID_NONE: WindowId = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Default)]
pub struct TabRegistry {
    tabs: HashMap<TabId, TabInfo>,
    focused_window: Option<WindowId>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the latest snapshot of a tab. An active tab replaces the active tab of its window.
    pub fn upsert(&mut self, tab: TabInfo) {
        if tab.active {
            self.deactivate_window(tab.window_id, tab.id);
        }
        self.tabs.insert(tab.id, tab);
    }

    /// Marks a tab as the active one in its window. Tabs we haven't seen yet are remembered
    /// without an address until an update arrives for them.
    pub fn activate(&mut self, tab_id: TabId, window_id: WindowId) {
        self.deactivate_window(window_id, tab_id);
        let tab = self.tabs.entry(tab_id).or_insert_with(|| TabInfo {
            id: tab_id,
            window_id,
            url: None,
            active: false,
        });
        tab.window_id = window_id;
        tab.active = true;
    }

    pub fn remove(&mut self, tab_id: TabId) -> Option<TabInfo> {
        self.tabs.remove(&tab_id)
    }

    pub fn focus_window(&mut self, window_id: WindowId) {
        self.focused_window = Some(window_id);
    }

    /// None of the browser windows has focus anymore.
    pub fn clear_focus(&mut self) {
        self.focused_window = None;
    }

    pub fn resolve(&self, tab_id: TabId) -> Result<&TabInfo> {
        self.tabs
            .get(&tab_id)
            .ok_or_else(|| anyhow!("Tab {tab_id} is not known, it may have been closed"))
    }

    pub fn active_tab(&self, window_id: WindowId) -> Option<TabId> {
        self.tabs
            .values()
            .find(|tab| tab.window_id == window_id && tab.active)
            .map(|tab| tab.id)
    }

    pub fn focused_window(&self) -> Option<WindowId> {
        self.focused_window
    }

    /// Active tab of the focused window. `None` while the browser is unfocused or before any
    /// focus event was seen.
    pub fn active_in_focused(&self) -> Option<TabId> {
        self.focused_window
            .and_then(|window_id| self.active_tab(window_id))
    }

    fn deactivate_window(&mut self, window_id: WindowId, except: TabId) {
        for tab in self
            .tabs
            .values_mut()
            .filter(|tab| tab.window_id == window_id && tab.id != except)
        {
            tab.active = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{TabInfo, TabRegistry};

    fn tab(id: i64, window_id: i64, url: &str, active: bool) -> TabInfo {
        TabInfo {
            id,
            window_id,
            url: Some(url.into()),
            active,
        }
    }

    #[test]
    fn test_single_active_tab_per_window() {
        let mut registry = TabRegistry::new();
        registry.upsert(tab(1, 10, "https://a.com", true));
        registry.upsert(tab(2, 10, "https://b.com", true));
        registry.upsert(tab(3, 20, "https://c.com", true));

        assert_eq!(registry.active_tab(10), Some(2));
        assert_eq!(registry.active_tab(20), Some(3));
        assert!(!registry.resolve(1).unwrap().active);

        registry.activate(1, 10);
        assert_eq!(registry.active_tab(10), Some(1));
        assert!(!registry.resolve(2).unwrap().active);
    }

    #[test]
    fn test_activate_unknown_tab() {
        let mut registry = TabRegistry::new();
        registry.activate(7, 1);

        let tab = registry.resolve(7).unwrap();
        assert_eq!(tab.url, None);
        assert!(tab.active);
    }

    #[test]
    fn test_removed_tab_does_not_resolve() {
        let mut registry = TabRegistry::new();
        registry.upsert(tab(1, 10, "https://a.com", true));
        registry.remove(1);

        assert!(registry.resolve(1).is_err());
        assert_eq!(registry.active_tab(10), None);
    }

    #[test]
    fn test_focused_window() {
        let mut registry = TabRegistry::new();
        registry.upsert(tab(1, 10, "https://a.com", true));
        registry.upsert(tab(2, 20, "https://b.com", true));
        assert_eq!(registry.active_in_focused(), None);

        registry.focus_window(20);
        assert_eq!(registry.focused_window(), Some(20));
        assert_eq!(registry.active_in_focused(), Some(2));

        registry.clear_focus();
        assert_eq!(registry.focused_window(), None);
        assert_eq!(registry.active_in_focused(), None);
    }
}
