use std::sync::{Arc, Mutex};

use annotation_events::{CustomEvent, EventTarget};

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// External listener that records every event it is subscribed to
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<CustomEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listen_to(&self, target: &dyn EventTarget, event_type: &str) {
        let events = Arc::clone(&self.events);
        target.on(
            event_type,
            Arc::new(move |event: &CustomEvent| events.lock().unwrap().push(event.clone())),
        );
    }

    pub fn events(&self) -> Vec<CustomEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.event_type).collect()
    }

    pub fn events_named(&self, event_type: &str) -> Vec<CustomEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}
