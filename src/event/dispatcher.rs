use serde_json::Value;
use std::any::Any;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::{debug, warn};

use super::{
    events::CustomEvent,
    handler::{EventTarget, Listener},
    registry::{EventRegistry, ANNOTATION_EVENTS},
};

/// Log tag for outward events
pub const FIRE_TAG: &str = "evt-dispatch-FIRE";
/// Log tag for inbound events reaching a registry handler
pub const RECEIVE_TAG: &str = "evt-dispatch-RECEIVE";

/// Binds registry handlers to a plugin's event surface and fires events outward
///
/// The EventDispatcher is the plugin's message gateway:
/// - Walks the [`EventRegistry`] when a component initializes and subscribes
///   each declared handler on the plugin, bound to that component instance
/// - Wires each event name at most once per dispatcher
/// - Lets internal components broadcast custom events through the plugin
///
/// It holds the plugin weakly; the plugin owns the dispatcher, not the other
/// way around.
pub struct EventDispatcher {
    target: Weak<dyn EventTarget>,
    registry: Arc<EventRegistry>,
    registered_listeners: Mutex<Vec<String>>,
}

impl EventDispatcher {
    /// Create a dispatcher using the plugin's default event table
    pub fn new(target: Weak<dyn EventTarget>) -> Self {
        Self::with_registry(target, Arc::clone(&ANNOTATION_EVENTS))
    }

    pub fn with_registry(target: Weak<dyn EventTarget>, registry: Arc<EventRegistry>) -> Self {
        Self {
            target,
            registry,
            registered_listeners: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe every event the registry declares for `component_id`
    ///
    /// Unknown component ids are ignored. Names already wired on this
    /// dispatcher, whichever component wired them, are skipped.
    pub fn register_listeners_for<C>(&self, component: Arc<C>, component_id: &str)
    where
        C: Any + Send + Sync,
    {
        let Some(handlers) = self.registry.handlers_for(component_id) else {
            debug!(component_id = %component_id, "No events declared for component");
            return;
        };
        let Some(target) = self.target.upgrade() else {
            debug!(component_id = %component_id, "Plugin dropped, listeners not registered");
            return;
        };

        // Check and claim names under one lock so concurrent registrations
        // cannot wire the same name twice
        let mut to_wire = Vec::new();
        {
            let mut registered = self
                .registered_listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            for (name, handler) in handlers {
                if registered.contains(name) {
                    continue;
                }
                registered.push(name.clone());
                to_wire.push((name.as_str(), Arc::clone(handler)));
            }
        }

        let component: Arc<dyn Any + Send + Sync> = component;
        for (name, handler) in to_wire {
            let component = Arc::clone(&component);
            let owner = component_id.to_string();
            let listener: Listener = Arc::new(move |event: &CustomEvent| {
                if let Err(e) = handler(event, &*component) {
                    warn!(
                        component_id = %owner,
                        event_type = %event.event_type,
                        error = %e,
                        "Event handler failed, ignoring event"
                    );
                }
            });
            Self::subscribe(&*target, name, listener);
        }

        debug!(component_id = %component_id, "Registered component listeners");
    }

    /// Subscribe `listener` to `event_type` on the plugin
    ///
    /// Records the name on every call; deduplication is the job of
    /// [`register_listeners_for`](Self::register_listeners_for). Nothing is
    /// recorded once the plugin is gone.
    pub fn register_listener(&self, event_type: &str, listener: Listener) {
        let Some(target) = self.target.upgrade() else {
            debug!(event_type = %event_type, "Plugin dropped, listener not subscribed");
            return;
        };
        Self::subscribe(&*target, event_type, listener);
        self.registered_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event_type.to_string());
    }

    /// Broadcast a custom event through the plugin
    pub fn fire(&self, event_type: &str, detail: Value) {
        debug!(tag = FIRE_TAG, event_type = %event_type, detail = %detail, "Firing event");

        let Some(target) = self.target.upgrade() else {
            return;
        };
        target.trigger(CustomEvent::new(event_type, detail));
    }

    /// Event names wired so far, in registration order
    pub fn registered_listeners(&self) -> Vec<String> {
        self.registered_listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn subscribe(target: &dyn EventTarget, event_type: &str, listener: Listener) {
        debug!(event_type = %event_type, "Subscribing listener");
        target.on(event_type, listener);
    }
}
