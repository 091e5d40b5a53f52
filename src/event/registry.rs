use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use super::{
    events::{ComponentId, CustomEvent, InboundEvent},
    handler::HandlerError,
    routes,
};

/// A routing function for one externally triggerable operation
///
/// Receives the inbound event and the component instance the dispatcher bound
/// when the component registered.
pub type Handler<C> = fn(&CustomEvent, &C) -> Result<(), HandlerError>;

/// A handler with its component type erased so one table can hold every component
pub type ErasedHandler =
    Arc<dyn Fn(&CustomEvent, &(dyn Any + Send + Sync)) -> Result<(), HandlerError> + Send + Sync>;

/// Table of component id -> event name -> handler
///
/// Built once, read-only afterwards. Adding an operation means adding one
/// entry here; the dispatcher walks whatever the table declares.
#[derive(Default, Clone)]
pub struct EventRegistry {
    components: BTreeMap<String, BTreeMap<String, ErasedHandler>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `handler` for `event_name` on the component `component_id`
    pub fn with<C: Any + Send + Sync>(
        mut self,
        component_id: impl AsRef<str>,
        event_name: impl AsRef<str>,
        handler: Handler<C>,
    ) -> Self {
        let component_id = component_id.as_ref().to_string();
        let expected = component_id.clone();
        let erased: ErasedHandler = Arc::new(
            move |event: &CustomEvent, component: &(dyn Any + Send + Sync)| {
                match component.downcast_ref::<C>() {
                    Some(component) => handler(event, component),
                    None => Err(HandlerError::ComponentMismatch {
                        component_id: expected.clone(),
                    }),
                }
            },
        );

        self.components
            .entry(component_id)
            .or_default()
            .insert(event_name.as_ref().to_string(), erased);
        self
    }

    /// Handlers declared for a component, if it declares any
    pub fn handlers_for(&self, component_id: &str) -> Option<&BTreeMap<String, ErasedHandler>> {
        self.components.get(component_id)
    }

    pub fn component_ids(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }
}

/// The annotation plugin's external event API
pub static ANNOTATION_EVENTS: LazyLock<Arc<EventRegistry>> = LazyLock::new(|| {
    use ComponentId::{AnnotationState, Controls};
    use InboundEvent::*;

    Arc::new(
        EventRegistry::new()
            .with(AnnotationState, OpenAnnotation, routes::open_annotation)
            .with(AnnotationState, CloseActiveAnnotation, routes::close_active_annotation)
            .with(AnnotationState, NewAnnotation, routes::new_annotation)
            .with(AnnotationState, DestroyAnnotation, routes::destroy_annotation)
            .with(Controls, AddingAnnotation, routes::adding_annotation)
            .with(Controls, CancelAddingAnnotation, routes::cancel_adding_annotation),
    )
});

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    struct Counter(std::sync::atomic::AtomicU32);

    fn bump(_event: &CustomEvent, counter: &Counter) -> Result<(), HandlerError> {
        counter.0.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        Ok(())
    }

    #[test]
    fn default_table_declares_every_inbound_event_under_its_component() {
        for event in InboundEvent::iter() {
            let handlers = ANNOTATION_EVENTS
                .handlers_for(event.component().as_ref())
                .expect("component should be declared");
            let name: &str = event.as_ref();
            assert!(
                handlers.contains_key(name),
                "{event} missing from registry"
            );
        }

        let ids: Vec<&str> = ANNOTATION_EVENTS.component_ids().collect();
        assert_eq!(ids, vec!["AnnotationState", "Controls"]);
    }

    #[test]
    fn unknown_component_has_no_handlers() {
        assert!(ANNOTATION_EVENTS.handlers_for("Player").is_none());
    }

    #[test]
    fn erased_handler_reaches_typed_component() {
        let registry = EventRegistry::new().with("Counter", "tick", bump);
        let counter = Counter(Default::default());

        let handler = &registry.handlers_for("Counter").unwrap()["tick"];
        handler(&CustomEvent::bare("tick"), &counter as &(dyn Any + Send + Sync)).unwrap();

        assert_eq!(counter.0.load(std::sync::atomic::Ordering::Relaxed), 1);
    }

    #[test]
    fn erased_handler_rejects_wrong_component_type() {
        let registry = EventRegistry::new().with("Counter", "tick", bump);

        let handler = &registry.handlers_for("Counter").unwrap()["tick"];
        let other = "not a counter".to_string();
        let result = handler(&CustomEvent::bare("tick"), &other as &(dyn Any + Send + Sync));

        assert_eq!(
            result,
            Err(HandlerError::ComponentMismatch {
                component_id: "Counter".to_string()
            })
        );
    }
}
