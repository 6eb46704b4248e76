//! Interaction layer for the Vecta canvas: tools, the transform overlay,
//! path point editing, viewport control, and the session that ties them
//! to a [`DocumentModel`](vecta_core::DocumentModel).

pub mod draw;
pub mod input;
pub mod path_edit;
pub mod session;
pub mod settings;
pub mod shortcuts;
pub mod tools;
pub mod transform_overlay;
pub mod viewport;

pub use input::{ClickTracker, InputEvent, Modifiers, PointerButton};
pub use path_edit::{HandleSide, PathEditController, PointDeletion};
pub use session::{EditorEvent, EditorSession};
pub use settings::{CreationDefaults, SettingsStore, StyleChange};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::{Tool, ToolContext, ToolKind, ToolOutput};
pub use transform_overlay::TransformGesture;
pub use viewport::ViewportController;
