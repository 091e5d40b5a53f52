use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tracing::debug;

use super::{
    events::CustomEvent,
    handler::{EventTarget, Listener},
};

const STREAM_CAPACITY: usize = 100;

/// Named-event emitter backing the plugin's event surface
///
/// Listeners registered with `on` run synchronously inside `emit`. Every
/// emitted event is also pushed onto a broadcast stream for observers that
/// would rather consume events asynchronously.
#[derive(Clone)]
pub struct EventEmitter {
    /// event type -> listeners in subscription order
    listeners: Arc<RwLock<HashMap<String, Vec<Listener>>>>,
    stream: broadcast::Sender<CustomEvent>,
}

impl EventEmitter {
    pub fn new() -> Self {
        let (stream, _) = broadcast::channel(STREAM_CAPACITY);
        Self {
            listeners: Arc::new(RwLock::new(HashMap::new())),
            stream,
        }
    }

    /// Subscribe a listener to an event type
    pub fn on(&self, event_type: &str, listener: Listener) {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        listeners
            .entry(event_type.to_string())
            .or_default()
            .push(listener);
    }

    /// Invoke every listener for the event's type, then publish it on the stream
    pub fn emit(&self, event: CustomEvent) {
        // Snapshot so listeners can subscribe or emit without deadlocking
        let targets: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event.event_type)
            .cloned()
            .unwrap_or_default();

        debug!(
            event_type = %event.event_type,
            listeners = targets.len(),
            "Emitting event"
        );

        for listener in &targets {
            listener(&event);
        }

        if self.stream.send(event).is_err() {
            debug!("Event emitted with no stream receivers");
        }
    }

    /// Subscribe to every event emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CustomEvent> {
        self.stream.subscribe()
    }

    pub fn listener_count(&self, event_type: &str) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .map_or(0, Vec::len)
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventTarget for EventEmitter {
    fn on(&self, event_type: &str, listener: Listener) {
        EventEmitter::on(self, event_type, listener);
    }

    fn trigger(&self, event: CustomEvent) {
        self.emit(event);
    }
}
