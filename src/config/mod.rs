//! Project configuration: the JSON document describing the canvas, widgets and per-frame updates.

pub mod model;
pub mod project;

pub use model::{CanvasDef, MetadataDef, ProjectDef, WidgetDef};
pub use project::Project;
