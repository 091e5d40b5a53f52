use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// An event travelling across the plugin's event surface
///
/// Inbound events are emitted by external callers at the plugin; outbound
/// events are fired by internal components. Either way the payload lives
/// under `detail` and is only interpreted by whoever handles the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub detail: Value,
}

impl CustomEvent {
    pub fn new(event_type: impl Into<String>, detail: Value) -> Self {
        Self {
            event_type: event_type.into(),
            detail,
        }
    }

    /// An event with no payload (`detail` is null)
    pub fn bare(event_type: impl Into<String>) -> Self {
        Self::new(event_type, Value::Null)
    }
}

/// Identifiers of the components that declare externally triggerable events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumString, IntoStaticStr)]
pub enum ComponentId {
    AnnotationState,
    Controls,
}

/// Event names external code may emit at the plugin
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum InboundEvent {
    // AnnotationState
    OpenAnnotation,
    CloseActiveAnnotation,
    NewAnnotation,
    DestroyAnnotation,

    // Controls
    AddingAnnotation,
    CancelAddingAnnotation,
}

impl InboundEvent {
    /// The component whose handler receives this event
    pub fn component(&self) -> ComponentId {
        match self {
            InboundEvent::OpenAnnotation
            | InboundEvent::CloseActiveAnnotation
            | InboundEvent::NewAnnotation
            | InboundEvent::DestroyAnnotation => ComponentId::AnnotationState,
            InboundEvent::AddingAnnotation | InboundEvent::CancelAddingAnnotation => {
                ComponentId::Controls
            }
        }
    }
}

/// Event names the plugin's own components fire outward
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "camelCase")]
pub enum PluginEvent {
    /// The annotation collection changed; detail is the full list
    OnStateChanged,
    AnnotationOpened,
    AnnotationClosed,
    AnnotationDeleted,
    AnnotationModeEnabled,
    AnnotationModeDisabled,
    EnteredAddingAnnotation,
    ExitingAddingAnnotation,
}
