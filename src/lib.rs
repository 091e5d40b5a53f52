// Library crate for the annotation plugin's event dispatch layer
// This file exposes the public API for integration tests

pub mod annotation;
pub mod config;
pub mod controls;
pub mod event;
pub mod plugin;
pub mod shared;

// Re-export commonly used types for easier access in tests
pub use annotation::{Annotation, AnnotationData, AnnotationState};
pub use config::{PluginOptions, UserMeta};
pub use controls::Controls;
pub use event::{
    CustomEvent, EventDispatcher, EventRegistry, EventTarget, InboundEvent, PluginEvent,
};
pub use plugin::AnnotationPlugin;
pub use shared::PluginError;
