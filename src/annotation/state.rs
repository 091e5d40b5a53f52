use serde_json::{json, Value};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use tracing::{debug, info, warn};

use super::models::{Annotation, AnnotationData, Comment};
use crate::{config::UserMeta, event::PluginEvent, plugin::AnnotationPlugin};

#[derive(Debug, Default)]
struct StateInner {
    /// Kept sorted by range start
    annotations: Vec<Annotation>,
    active_id: Option<i64>,
}

/// Owns the plugin's annotations and which one is open
///
/// Every mutation fires an outward event through the plugin once internal
/// locks are released, so listeners can read state back.
pub struct AnnotationState {
    plugin: Weak<AnnotationPlugin>,
    inner: RwLock<StateInner>,
}

impl AnnotationState {
    pub fn new(plugin: Weak<AnnotationPlugin>) -> Self {
        Self {
            plugin,
            inner: RwLock::new(StateInner::default()),
        }
    }

    pub(crate) fn plugin(&self) -> Option<Arc<AnnotationPlugin>> {
        self.plugin.upgrade()
    }

    pub fn annotations(&self) -> Vec<Annotation> {
        self.read().annotations.clone()
    }

    pub fn find(&self, id: i64) -> Option<Annotation> {
        self.read().annotations.iter().find(|a| a.id == id).cloned()
    }

    pub fn active_annotation(&self) -> Option<Annotation> {
        let inner = self.read();
        let active_id = inner.active_id?;
        inner.annotations.iter().find(|a| a.id == active_id).cloned()
    }

    /// Replace the collection with initial data, without firing events
    pub fn load(&self, data: Vec<AnnotationData>) {
        let author = self.author();
        let mut inner = self.write();
        inner.annotations.clear();
        inner.active_id = None;
        for item in data {
            let id = match item.id {
                Some(id) if !inner.annotations.iter().any(|a| a.id == id) => id,
                _ => next_id(&inner.annotations),
            };
            inner.annotations.push(Annotation::from_data(item, id, &author));
        }
        sort_by_start(&mut inner.annotations);
        info!(count = inner.annotations.len(), "Loaded annotations");
    }

    /// Make the annotation with `id` the active one
    ///
    /// Returns false, changing nothing, if no annotation has that id.
    pub fn open_annotation(&self, id: i64) -> bool {
        let Some(annotation) = self.find(id) else {
            debug!(annotation_id = id, "No annotation to open");
            return false;
        };

        let previous = self.read().active_id;
        if previous.is_some_and(|active| active != id) {
            self.clear_active();
        }

        self.write().active_id = Some(id);
        debug!(annotation_id = id, "Annotation opened");
        self.fire(PluginEvent::AnnotationOpened, json!({ "annotation": annotation }));
        true
    }

    /// Close whatever annotation is open
    pub fn clear_active(&self) {
        let closed = {
            let mut inner = self.write();
            let Some(active_id) = inner.active_id.take() else {
                return;
            };
            inner.annotations.iter().find(|a| a.id == active_id).cloned()
        };

        if let Some(annotation) = closed {
            debug!(annotation_id = annotation.id, "Annotation closed");
            self.fire(PluginEvent::AnnotationClosed, json!({ "annotation": annotation }));
        }
    }

    /// Add a new annotation built from `data` and open it
    ///
    /// Uses the id from `data` when it is free, otherwise the next unused id.
    pub fn create_and_add_annotation(&self, data: AnnotationData) -> i64 {
        let author = self.author();
        let id = {
            let mut inner = self.write();
            let id = match data.id {
                Some(id) if inner.annotations.iter().any(|a| a.id == id) => {
                    let fresh = next_id(&inner.annotations);
                    warn!(
                        requested_id = id,
                        assigned_id = fresh,
                        "Annotation id already taken"
                    );
                    fresh
                }
                Some(id) => id,
                None => next_id(&inner.annotations),
            };
            inner
                .annotations
                .push(Annotation::from_data(data, id, &author));
            sort_by_start(&mut inner.annotations);
            id
        };

        info!(annotation_id = id, "Annotation created");
        self.state_changed();
        self.open_annotation(id);
        id
    }

    /// Remove the annotation with `id`, closing it first if it is open
    ///
    /// Returns false if no annotation has that id.
    pub fn destroy_annotation(&self, id: i64) -> bool {
        if self.find(id).is_none() {
            debug!(annotation_id = id, "No annotation to destroy");
            return false;
        }
        if self.read().active_id == Some(id) {
            self.clear_active();
        }

        let removed = {
            let mut inner = self.write();
            let before = inner.annotations.len();
            inner.annotations.retain(|a| a.id != id);
            inner.annotations.len() != before
        };
        if !removed {
            return false;
        }

        info!(annotation_id = id, "Annotation destroyed");
        self.fire(PluginEvent::AnnotationDeleted, json!({ "id": id }));
        self.state_changed();
        true
    }

    /// Append a comment by the configured user; returns the new comment id
    pub fn add_comment(&self, annotation_id: i64, body: &str) -> Option<String> {
        let comment = Comment::new(body, &self.author());
        let comment_id = comment.id.clone();
        {
            let mut inner = self.write();
            let annotation = inner
                .annotations
                .iter_mut()
                .find(|a| a.id == annotation_id)?;
            annotation.comments.push(comment);
        }

        debug!(annotation_id, comment_id = %comment_id, "Comment added");
        self.state_changed();
        Some(comment_id)
    }

    fn state_changed(&self) {
        let annotations = self.annotations();
        self.fire(PluginEvent::OnStateChanged, json!(annotations));
    }

    fn fire(&self, event: PluginEvent, detail: Value) {
        if let Some(plugin) = self.plugin() {
            plugin.fire(event.as_ref(), detail);
        }
    }

    fn author(&self) -> UserMeta {
        self.plugin()
            .map(|plugin| plugin.options().meta.clone())
            .unwrap_or_default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StateInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StateInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One past the highest id, or the lowest free positive id once that overflows
fn next_id(annotations: &[Annotation]) -> i64 {
    let Some(max) = annotations.iter().map(|a| a.id).max() else {
        return 1;
    };
    max.checked_add(1).unwrap_or_else(|| {
        (1..=i64::MAX)
            .find(|id| !annotations.iter().any(|a| a.id == *id))
            .unwrap_or(1)
    })
}

fn sort_by_start(annotations: &mut [Annotation]) {
    annotations.sort_by(|a, b| a.range.start.total_cmp(&b.range.start));
}
