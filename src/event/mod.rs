// Event dispatch between the annotation plugin and external callers
//
// Inbound named events are routed to component handlers declared in the
// registry; components fire state changes outward through the dispatcher.

// Public API - what other modules can use
pub use bus::EventEmitter;
pub use dispatcher::{EventDispatcher, FIRE_TAG, RECEIVE_TAG};
pub use events::{ComponentId, CustomEvent, InboundEvent, PluginEvent};
pub use handler::{EventTarget, HandlerError, Listener};
pub use registry::{ErasedHandler, EventRegistry, Handler, ANNOTATION_EVENTS};
pub use routes::coerce_id;

// Internal modules
mod bus;
mod dispatcher;
mod events;
mod handler;
mod registry;
mod routes;
