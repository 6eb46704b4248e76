pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod id;
pub mod model;
pub mod selection;
pub mod transform;

pub use config::EditorConfig;
pub use document::{Document, DocumentEvent, DocumentModel, ItemPatch};
pub use error::DocumentError;
pub use geometry::ViewTransform;
pub use id::ItemId;
pub use model::*;
pub use selection::SelectionState;
pub use transform::Transform;

// Re-export kurbo so downstream crates share one set of geometry types
pub use kurbo;
