use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::broadcast;
use tracing::info;

use crate::{
    annotation::AnnotationState,
    config::PluginOptions,
    controls::Controls,
    event::{
        ComponentId, CustomEvent, EventDispatcher, EventEmitter, EventTarget, Listener,
        PluginEvent,
    },
};

/// The embedded annotation plugin
///
/// External code talks to it only through its event surface: `trigger` a
/// named event to drive the components, `on` or `subscribe_events` to observe
/// what they fire back.
pub struct AnnotationPlugin {
    emitter: EventEmitter,
    dispatcher: EventDispatcher,
    annotation_state: Arc<AnnotationState>,
    controls: Arc<Controls>,
    active: AtomicBool,
    options: PluginOptions,
}

impl AnnotationPlugin {
    pub fn new(options: PluginOptions) -> Arc<Self> {
        let plugin = Arc::new_cyclic(|plugin: &Weak<Self>| {
            let target: Weak<dyn EventTarget> = plugin.clone();
            Self {
                emitter: EventEmitter::new(),
                dispatcher: EventDispatcher::new(target),
                annotation_state: Arc::new(AnnotationState::new(plugin.clone())),
                controls: Arc::new(Controls::new(plugin.clone())),
                active: AtomicBool::new(options.start_in_annotation_mode),
                options,
            }
        });

        plugin.dispatcher.register_listeners_for(
            Arc::clone(&plugin.annotation_state),
            ComponentId::AnnotationState.as_ref(),
        );
        plugin
            .dispatcher
            .register_listeners_for(Arc::clone(&plugin.controls), ComponentId::Controls.as_ref());
        plugin
            .annotation_state
            .load(plugin.options.annotations_objects.clone());

        info!(
            active = plugin.is_active(),
            listeners = plugin.dispatcher.registered_listeners().len(),
            "Annotation plugin initialized"
        );
        plugin
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Switch annotation mode on or off
    ///
    /// Turning it off also leaves add mode and closes the open annotation.
    pub fn toggle_annotations(&self) {
        let active = !self.active.fetch_xor(true, Ordering::SeqCst);
        info!(active, "Annotation mode toggled");

        if active {
            self.fire(PluginEvent::AnnotationModeEnabled.as_ref(), Value::Null);
        } else {
            self.controls.cancel_add_new();
            self.annotation_state.clear_active();
            self.fire(PluginEvent::AnnotationModeDisabled.as_ref(), Value::Null);
        }
    }

    /// Broadcast a custom event to external listeners
    pub fn fire(&self, event_type: &str, detail: Value) {
        self.dispatcher.fire(event_type, detail);
    }

    /// Stream of every event triggered on the plugin from now on
    pub fn subscribe_events(&self) -> broadcast::Receiver<CustomEvent> {
        self.emitter.subscribe()
    }

    pub fn annotation_state(&self) -> &Arc<AnnotationState> {
        &self.annotation_state
    }

    pub fn controls(&self) -> &Arc<Controls> {
        &self.controls
    }

    pub fn dispatcher(&self) -> &EventDispatcher {
        &self.dispatcher
    }

    pub fn options(&self) -> &PluginOptions {
        &self.options
    }
}

impl EventTarget for AnnotationPlugin {
    fn on(&self, event_type: &str, listener: Listener) {
        self.emitter.on(event_type, listener);
    }

    fn trigger(&self, event: CustomEvent) {
        self.emitter.emit(event);
    }
}
