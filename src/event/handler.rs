use std::sync::Arc;
use thiserror::Error;

use super::events::CustomEvent;

/// Errors a registry handler can report
///
/// These never leave the dispatcher: the bound listener logs them and moves
/// on, so a bad external event degrades to a no-op.
#[derive(Debug, Error, PartialEq)]
pub enum HandlerError {
    #[error("Malformed payload for {event}: {reason}")]
    MalformedPayload { event: String, reason: String },

    #[error("Handler for {component_id} received a different component type")]
    ComponentMismatch { component_id: String },

    #[error("Plugin is no longer available")]
    PluginUnavailable,
}

impl HandlerError {
    /// Create a malformed payload error for the given event
    pub fn malformed(event: &CustomEvent, reason: impl Into<String>) -> Self {
        HandlerError::MalformedPayload {
            event: event.event_type.clone(),
            reason: reason.into(),
        }
    }
}

/// Callback subscribed to a named event on an [`EventTarget`]
pub type Listener = Arc<dyn Fn(&CustomEvent) + Send + Sync>;

/// The event surface a plugin exposes to the dispatcher
///
/// `on` subscribes a listener to an event name and `trigger` broadcasts an
/// event to every listener subscribed to its name, synchronously and in
/// subscription order.
pub trait EventTarget: Send + Sync {
    fn on(&self, event_type: &str, listener: Listener);

    fn trigger(&self, event: CustomEvent);
}
