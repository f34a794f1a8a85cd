//! Presentation flags shared by every client of one server process.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use utoipa::ToSchema;

pub mod api {
    pub mod v1;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UiPreferences {
    pub sidebar_collapsed: bool,
    pub dark_mode: bool,
}

/// Partial update; absent flags keep their current value.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub sidebar_collapsed: Option<bool>,
    pub dark_mode: Option<bool>,
}

/// Cloneable handle to the single preferences value of a server.
///
/// Created once at startup and handed to the router state; nothing is
/// persisted across restarts.
#[derive(Debug, Clone, Default)]
pub struct PreferenceStore {
    inner: Arc<RwLock<UiPreferences>>,
}

impl PreferenceStore {
    pub fn new(initial: UiPreferences) -> Self {
        Self {
            inner: Arc::new(RwLock::new(initial)),
        }
    }

    pub fn get(&self) -> UiPreferences {
        *self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Applies `update` and returns the resulting preferences.
    pub fn update(&self, update: PreferencesUpdate) -> UiPreferences {
        let mut preferences = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(sidebar_collapsed) = update.sidebar_collapsed {
            preferences.sidebar_collapsed = sidebar_collapsed;
        }
        if let Some(dark_mode) = update.dark_mode {
            preferences.dark_mode = dark_mode;
        }
        *preferences
    }
}
