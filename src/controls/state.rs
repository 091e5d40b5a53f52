use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock, Weak};
use tracing::debug;

use crate::{event::PluginEvent, plugin::AnnotationPlugin};

/// Snapshot of the controls' UI mode
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UiState {
    /// The user is placing a new annotation
    pub adding: bool,
}

/// Plugin controls: tracks whether a new annotation is being placed
pub struct Controls {
    plugin: Weak<AnnotationPlugin>,
    ui_state: RwLock<UiState>,
}

impl Controls {
    pub fn new(plugin: Weak<AnnotationPlugin>) -> Self {
        Self {
            plugin,
            ui_state: RwLock::new(UiState::default()),
        }
    }

    pub(crate) fn plugin(&self) -> Option<Arc<AnnotationPlugin>> {
        self.plugin.upgrade()
    }

    pub fn ui_state(&self) -> UiState {
        *self.ui_state.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_adding(&self) -> bool {
        self.ui_state().adding
    }

    /// Enter "add new" mode, closing any open annotation first
    pub fn start_add_new(&self) {
        if self.is_adding() {
            return;
        }
        let plugin = self.plugin();
        if let Some(plugin) = &plugin {
            plugin.annotation_state().clear_active();
        }

        self.set_adding(true);
        debug!("Entered add mode");
        if let Some(plugin) = plugin {
            plugin.fire(PluginEvent::EnteredAddingAnnotation.as_ref(), Value::Null);
        }
    }

    /// Leave "add new" mode; does nothing when not adding
    pub fn cancel_add_new(&self) {
        if !self.set_adding(false) {
            return;
        }

        debug!("Exited add mode");
        if let Some(plugin) = self.plugin() {
            plugin.fire(PluginEvent::ExitingAddingAnnotation.as_ref(), Value::Null);
        }
    }

    /// Returns the previous value
    fn set_adding(&self, adding: bool) -> bool {
        let mut ui_state = self.ui_state.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut ui_state.adding, adding)
    }
}
