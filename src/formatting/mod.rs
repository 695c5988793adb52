/// Extension-keyed comment styles and block rendering
pub mod comment;

pub use comment::{render, style_for_extension, style_for_path, AnnotationBlock, CommentStyle};
