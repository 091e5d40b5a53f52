// Public API - what other modules can use
pub use models::{Annotation, AnnotationData, Comment, CommentMeta, Shape, TimeRange};
pub use state::AnnotationState;

// Internal modules
pub mod models;
mod state;
