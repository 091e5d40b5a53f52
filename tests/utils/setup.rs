use serde_json::{json, Value};
use std::sync::Arc;
use strum::IntoEnumIterator;

use annotation_events::{AnnotationPlugin, PluginEvent, PluginOptions};

use super::mocks::EventRecorder;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

pub struct TestSetup {
    pub plugin: Arc<AnnotationPlugin>,
    /// Subscribed to every event the plugin fires outward
    pub recorder: EventRecorder,
}

pub struct TestSetupBuilder {
    annotations: Vec<Value>,
    active: bool,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            annotations: vec![],
            active: false,
        }
    }

    pub fn with_annotation(mut self, id: i64, start: f64) -> Self {
        self.annotations.push(json!({
            "id": id,
            "range": { "start": start, "end": start + 5.0 },
            "commentStr": format!("annotation {id}")
        }));
        self
    }

    pub fn with_three_annotations(self) -> Self {
        self.with_annotation(1, 10.0)
            .with_annotation(2, 20.0)
            .with_annotation(3, 30.0)
    }

    pub fn active(mut self) -> Self {
        self.active = true;
        self
    }

    pub fn build(self) -> TestSetup {
        let options: PluginOptions = serde_json::from_value(json!({
            "annotationsObjects": self.annotations,
            "startInAnnotationMode": self.active,
            "meta": { "user_id": 1, "user_name": "tester" }
        }))
        .expect("test options should deserialize");

        let plugin = AnnotationPlugin::new(options);
        let recorder = EventRecorder::new();
        for event in PluginEvent::iter() {
            recorder.listen_to(&*plugin, event.as_ref());
        }

        TestSetup { plugin, recorder }
    }
}
