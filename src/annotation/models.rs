use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::UserMeta;

/// Playback span an annotation covers, in seconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
}

/// Marked region on the video frame, as percentages of width/height
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentMeta {
    pub datetime: DateTime<Utc>,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default = "new_comment_id")]
    pub id: String,
    pub meta: CommentMeta,
    pub body: String,
}

fn new_comment_id() -> String {
    Uuid::new_v4().to_string()
}

impl Comment {
    /// Creates a comment authored by `author`, timestamped now
    pub fn new(body: impl Into<String>, author: &UserMeta) -> Self {
        Self {
            id: new_comment_id(),
            meta: CommentMeta {
                datetime: Utc::now(),
                user_id: author.user_id,
                user_name: author.user_name.clone(),
            },
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: i64,
    pub range: TimeRange,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Payload accepted when creating an annotation
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationData {
    #[serde(default)]
    pub id: Option<i64>,
    pub range: TimeRange,
    #[serde(default)]
    pub shape: Option<Shape>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    /// Body of an opening comment, authored by the current user
    #[serde(default)]
    pub comment_str: Option<String>,
}

impl Annotation {
    /// Builds an annotation from creation data under the given id
    pub fn from_data(data: AnnotationData, id: i64, author: &UserMeta) -> Self {
        let mut comments = data.comments;
        if let Some(body) = data.comment_str.filter(|s| !s.trim().is_empty()) {
            comments.push(Comment::new(body, author));
        }

        Self {
            id,
            range: data.range,
            shape: data.shape,
            comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn author() -> UserMeta {
        UserMeta {
            user_id: Some(7),
            user_name: Some("alice".to_string()),
        }
    }

    #[test]
    fn data_accepts_minimal_payload() {
        let data: AnnotationData =
            serde_json::from_value(json!({ "range": { "start": 12.5 } })).unwrap();

        assert_eq!(data.id, None);
        assert_eq!(data.range.end, None);
        assert!(data.comments.is_empty());
        assert!(data.shape.is_none());
    }

    #[test]
    fn comment_str_becomes_first_comment() {
        let data: AnnotationData = serde_json::from_value(json!({
            "range": { "start": 1.0, "end": 4.0 },
            "shape": { "x1": 10.0, "y1": 10.0, "x2": 40.0, "y2": 30.0 },
            "commentStr": "Look at this"
        }))
        .unwrap();

        let annotation = Annotation::from_data(data, 3, &author());

        assert_eq!(annotation.id, 3);
        assert_eq!(annotation.comments.len(), 1);
        assert_eq!(annotation.comments[0].body, "Look at this");
        assert_eq!(annotation.comments[0].meta.user_name.as_deref(), Some("alice"));
    }

    #[test]
    fn blank_comment_str_is_dropped() {
        let data: AnnotationData = serde_json::from_value(json!({
            "range": { "start": 1.0 },
            "commentStr": "   "
        }))
        .unwrap();

        let annotation = Annotation::from_data(data, 1, &author());

        assert!(annotation.comments.is_empty());
    }

    #[test]
    fn existing_comments_keep_their_ids() {
        let data: AnnotationData = serde_json::from_value(json!({
            "range": { "start": 0.0 },
            "comments": [{
                "id": "c-1",
                "meta": { "datetime": "2024-03-01T10:00:00Z", "user_name": "bob" },
                "body": "first"
            }]
        }))
        .unwrap();

        let annotation = Annotation::from_data(data, 1, &author());

        assert_eq!(annotation.comments[0].id, "c-1");
        assert_eq!(annotation.comments[0].meta.user_id, None);
    }
}
