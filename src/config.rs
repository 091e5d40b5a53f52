use serde::Deserialize;
use std::path::Path;

use crate::{annotation::AnnotationData, shared::PluginError};

/// Identity stamped on comments created through the plugin
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UserMeta {
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Options the host passes when creating the plugin
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PluginOptions {
    /// Annotations present when the plugin starts
    pub annotations_objects: Vec<AnnotationData>,
    pub meta: UserMeta,
    pub start_in_annotation_mode: bool,
}

impl PluginOptions {
    pub fn from_json_str(json: &str) -> Result<Self, PluginError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, PluginError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_defaults() {
        let options = PluginOptions::from_json_str("{}").unwrap();

        assert!(options.annotations_objects.is_empty());
        assert!(!options.start_in_annotation_mode);
        assert_eq!(options.meta, UserMeta::default());
    }

    #[test]
    fn camel_case_keys_are_read() {
        let options = PluginOptions::from_json_str(
            r#"{
                "startInAnnotationMode": true,
                "meta": { "user_id": 3, "user_name": "dana" },
                "annotationsObjects": [{ "id": 1, "range": { "start": 5 } }]
            }"#,
        )
        .unwrap();

        assert!(options.start_in_annotation_mode);
        assert_eq!(options.meta.user_name.as_deref(), Some("dana"));
        assert_eq!(options.annotations_objects[0].id, Some(1));
    }

    #[test]
    fn invalid_json_is_a_config_error() {
        let result = PluginOptions::from_json_str("{ not json");

        assert!(matches!(result, Err(PluginError::Config(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = PluginOptions::from_path("/nonexistent/annotation-options.json");

        assert!(matches!(result, Err(PluginError::Io(_))));
    }
}
