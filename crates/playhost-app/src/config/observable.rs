//! Shared, observable menu settings

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::store::SettingsStore;
use super::types::MenuSettings;
use playhost_core::prelude::*;

type Listener = Box<dyn Fn(&MenuSettings) + Send + Sync>;

struct State {
    settings: MenuSettings,
    listeners: Vec<Listener>,
}

/// Menu settings shared between the host UI and the session.
///
/// Every change is reported to subscribers with the full settings object.
/// Listeners run with the settings locked, in subscription order, so they
/// observe changes in the order they were made. A listener must not call
/// back into the handle.
#[derive(Clone)]
pub struct MenuSettingsHandle {
    state: Arc<Mutex<State>>,
}

impl std::fmt::Debug for MenuSettingsHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MenuSettingsHandle")
            .field("settings", &state.settings)
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

impl Default for MenuSettingsHandle {
    fn default() -> Self {
        Self::new(MenuSettings::default())
    }
}

impl MenuSettingsHandle {
    pub fn new(settings: MenuSettings) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                settings,
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of the current settings
    pub fn get(&self) -> MenuSettings {
        self.lock().settings.clone()
    }

    /// Mutate the settings in place.
    ///
    /// Subscribers are notified only when `f` actually changed something.
    /// Returns whether a change was made.
    pub fn update(&self, f: impl FnOnce(&mut MenuSettings)) -> bool {
        let mut state = self.lock();
        let before = state.settings.clone();
        f(&mut state.settings);
        if state.settings == before {
            return false;
        }

        trace!("Menu settings changed, notifying {} listener(s)", state.listeners.len());
        for listener in &state.listeners {
            listener(&state.settings);
        }
        true
    }

    /// Register a listener for future changes
    pub fn subscribe(&self, listener: impl Fn(&MenuSettings) + Send + Sync + 'static) {
        self.lock().listeners.push(Box::new(listener));
    }

    /// Write every future change through to `store`. Save failures are logged.
    pub fn persist_to(&self, store: SettingsStore) {
        self.subscribe(move |settings| {
            if let Err(e) = store.save(settings) {
                warn!("Failed to save menu settings: {}", e);
            }
        });
    }
}
